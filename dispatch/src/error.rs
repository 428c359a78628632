#[derive(Debug, Clone)]
pub enum DispatchError {
	MalformedMessage { topic: String, detail: String },
	UnrecognizedTopic(String),
}

impl std::fmt::Display for DispatchError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			DispatchError::MalformedMessage { topic, detail } => {
				write!(f, "malformed message on {}: {}", topic, detail)
			}
			DispatchError::UnrecognizedTopic(topic) => {
				write!(f, "unrecognized topic: {}", topic)
			}
		}
	}
}

impl std::error::Error for DispatchError {}
