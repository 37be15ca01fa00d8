use std::io;

use anyhow::{Context, Result, bail};
use jmdict_pos::PartOfSpeech;
use jmdict_types::parse_mecab_output;

fn main() -> Result<()> {
    let input = io::read_to_string(io::stdin()).context("reading MeCab output from stdin")?;
    let fragments = parse_mecab_output(&input);
    if fragments.is_empty() {
        bail!("usage: echo 亀が歩く | mecab | cargo run -p jmdict-pos --example classify");
    }

    for frag in fragments {
        let label = PartOfSpeech::of(&frag)
            .map(|pos| pos.label())
            .unwrap_or("-");
        println!(
            "{:<8} {:<8} {:<6} {:<12} {}",
            frag.surface,
            frag.base_form,
            frag.category,
            frag.conjugation.as_deref().unwrap_or("*"),
            label
        );
    }

    Ok(())
}
