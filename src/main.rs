// src/main.rs

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use pincer::game::board::Position;
use pincer::game::defs::START_POS_FEN;
use pincer::search::perft::perft;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let (fen, depth) = match args.as_slice() {
        [] => (START_POS_FEN.to_string(), 5),
        [depth] => (START_POS_FEN.to_string(), parse_depth(depth)?),
        [fen, depth] => (fen.clone(), parse_depth(depth)?),
        _ => bail!("usage: pincer [\"<fen>\"] [depth]"),
    };

    let mut pos = Position::from_fen(&fen)
        .map_err(|e| anyhow::anyhow!(e))
        .context("invalid FEN")?;

    println!("{pos}");

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} perft({msg}) {elapsed}")
            .expect("static template"),
    );
    spinner.set_message(depth.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let result = perft(&mut pos, depth);

    spinner.finish_and_clear();
    print!("{result}");

    Ok(())
}

fn parse_depth(s: &str) -> Result<usize> {
    let depth: usize = s.parse().with_context(|| format!("bad depth '{s}'"))?;
    if depth > 10 {
        bail!("depth {depth} is unreasonably deep for full perft");
    }
    Ok(depth)
}
