// Trains the target-selection agent against the scripted arena opponent.
//
//   RUST_LOG=skirmish=info cargo run --example duel -- 65 false
//
// Arguments: episode budget (default 10), load weights from
// agent_weights/weights.txt (default false).
use skirmish::control::Controller;
use skirmish::env::Arena;
use skirmish::{AgentConfig, run_session};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("skirmish=info")),
        )
        .with_target(true)
        .init();

    let mut args = std::env::args().skip(1);
    let mut config = AgentConfig::default();
    match args.next() {
        Some(episodes) => config.episodes = episodes.parse()?,
        None => println!("Number of episodes not specified. Defaulting to {}.", config.episodes),
    }
    match args.next() {
        Some(load) => config.load_weights = load.parse()?,
        None => println!("Load weights argument not specified. Defaulting to not loading."),
    }
    println!("Running {} episodes.", config.episodes);

    let mut arena = Arena::line_up(5, 5, 16);
    let mut controller = Controller::from_config(config)?;
    let stats = run_session(&mut arena, &mut controller)?;

    println!("{}", controller.schedule().curve());
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
