fn main() {
    if let Err(err) = csvquery::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
