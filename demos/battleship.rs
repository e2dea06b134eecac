use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use homomorphic_battleship::config::GameConfig;
use homomorphic_battleship::fleet::random_grid;
use homomorphic_battleship::game::{
    Contender, GameSession, InteractivePlayer, Outcome, Player, ScriptedOpponent, Seat,
};
use homomorphic_battleship::Result;

#[derive(Parser)]
#[command(about = "Battleship over Paillier-encrypted boards")]
struct Arguments {
    /// JSON game configuration
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    #[arg(short = 'k', long)]
    key_bits: Option<u64>,

    #[arg(short = 's', long)]
    seed: Option<u64>,

    /// Let the computer play your side too
    #[arg(long, action = clap::ArgAction::SetTrue)]
    autoplay: bool,

    #[arg(short = 'n', long, default_value = "Alice")]
    name: String,
}

fn run(args: Arguments) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => GameConfig::from_json_file(path)?,
        None => GameConfig::default(),
    };
    if let Some(bits) = args.key_bits {
        config.key_bits = bits;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.validate()?;

    println!("=============================================");
    println!("   HOMOMORPHIC BATTLESHIP    ");
    println!("=============================================\n");

    let mut rng = config.rng()?;
    let you: Box<dyn Player> = if args.autoplay {
        Box::new(ScriptedOpponent::new(ChaCha20Rng::seed_from_u64(rng.gen())))
    } else {
        Box::new(InteractivePlayer::stdio())
    };
    let bob = Box::new(ScriptedOpponent::new(ChaCha20Rng::seed_from_u64(rng.gen())));
    let first = Contender::new(args.name, random_grid(&config.fleet, &mut rng)?, you);
    let second = Contender::new("Bob", random_grid(&config.fleet, &mut rng)?, bob);

    println!("Generating {}-bit keys and encrypting both boards...", config.key_bits);
    let mut session = GameSession::with_rng(config.key_bits, first, second, rng)?;

    while !session.is_over() {
        let attacker = session.current_attacker();
        let defender = attacker.opponent();
        println!(
            "\n=== TURN {}: {} attacks {} ===",
            session.current_turn(),
            session.name(attacker),
            session.name(defender)
        );
        println!("\n--- {}'s Board Status ---", session.name(defender));
        print!("{}", session.view_of(defender));

        let report = session.play_turn()?;
        if attacker == Seat::Second || args.autoplay {
            println!("{} guesses: {}", session.name(attacker), report.coordinate);
        }
        match report.outcome {
            Outcome::Hit | Outcome::Won => {
                println!("*** {} scored a HIT! ***", session.name(attacker))
            }
            Outcome::Miss => println!("--- {} missed. ---", session.name(attacker)),
        }
        println!(
            "   {} has {} ship parts remaining.",
            session.name(defender),
            report.remaining
        );
    }

    if let Some(winner) = session.winner_name() {
        println!("\nGAME OVER! {winner} wins!");
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    match run(Arguments::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
