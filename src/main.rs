fn main() {
    if let Err(e) = speechdeck_lib::run() {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}
