fn main() {
    if let Err(err) = cacheproxy::run() {
        eprintln!("cacheproxy: {err}");
        eprintln!("usage: cacheproxy <port>");
        std::process::exit(1);
    }
}
