fn main() {
    if let Err(e) = nanoc_drv::main() {
        // Error messages go to stdout, not stderr.
        println!("error: {e}");
        std::process::exit(1);
    }
}
