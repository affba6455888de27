fn main() {
    if let Err(err) = relative_layout_rs::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
