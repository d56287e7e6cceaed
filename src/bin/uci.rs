//! UCI engine entry point: wires up logging, warms the lazily-built attack
//! tables so the first search isn't paying their construction cost, and
//! hands stdin/stdout to [`raptor::uci::run`].

fn main() {
    #[cfg(feature = "cli")]
    raptor::logger::init_logging("logs/raptor.log", "raptor=info");

    raptor::attack_tables::attack_tables();

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    if let Err(err) = raptor::uci::run(stdin.lock(), stdout.lock()) {
        eprintln!("uci loop terminated: {err}");
        std::process::exit(1);
    }
}
