fn main() {
	runtime::run_demo();
}
