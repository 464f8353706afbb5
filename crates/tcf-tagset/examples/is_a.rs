use std::env;

use anyhow::{Context, Result};
use tcf_tagset::Tagset;

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let candidate = args
        .next()
        .context("usage: cargo run -p tcf-tagset --example is_a -- <tag> <allowed> [tagset-file]")?;
    let allowed = args.next().context("missing <allowed> tag")?;
    let tagset = match args.next() {
        Some(path) => std::sync::Arc::new(Tagset::load(&path)?),
        None => Tagset::builtin(),
    };

    for tag in [&candidate, &allowed] {
        if !tagset.contains(tag) {
            println!("note: {tag:?} is not declared in the tagset");
        }
    }
    println!("ancestors of {candidate}: {}", tagset.ancestors(&candidate).join(", "));
    println!(
        "{candidate} is-a {allowed}? {}",
        tagset.is_a(&candidate, &allowed)
    );

    Ok(())
}
