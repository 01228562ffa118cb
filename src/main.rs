fn main() {
    mapunit::cli::run();
}
