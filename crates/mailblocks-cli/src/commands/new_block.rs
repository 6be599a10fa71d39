/*
 * new_block.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! New-block command implementation.

use anyhow::{Context, Result};

use mailblocks::{Block, BlockId, BlockKind};

/// Arguments for the new-block command
#[derive(Debug, Default)]
pub struct NewBlockArgs {
    /// Block kind id, e.g. `info-box`
    pub kind: String,
    pub id: String,
}

/// Execute the new-block command
pub fn execute(args: NewBlockArgs) -> Result<()> {
    println!("{}", new_block_json(&args.kind, &args.id)?);
    Ok(())
}

fn new_block_json(kind: &str, id: &str) -> Result<String> {
    if id.trim().is_empty() {
        anyhow::bail!("Block id must not be empty");
    }
    let kind = BlockKind::from_id(kind).with_context(|| {
        let known: Vec<&str> = BlockKind::ALL.iter().map(|k| k.id()).collect();
        format!("Expected one of: {}", known.join(", "))
    })?;
    let block = Block::new_default(kind, BlockId::new(id));
    Ok(serde_json::to_string_pretty(&block)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_block_json_round_trips() {
        let json = new_block_json("button", "cta").unwrap();
        let block: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(block.kind(), BlockKind::Button);
        assert_eq!(block.id().as_str(), "cta");
    }

    #[test]
    fn test_unknown_kind_lists_known_kinds() {
        let err = new_block_json("carousel", "c").unwrap_err();
        assert!(format!("{:#}", err).contains("info-box"));
    }
}
