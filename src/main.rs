fn main() {
    if let Err(e) = carbsys_rs::adapters::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
