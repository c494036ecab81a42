use anyhow::{Context, bail};
use dailymines_core::{CellId, Coord};
use std::str::FromStr;

/// One line of player input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Move {
    Reveal(CellId),
    Flag(CellId),
    Restart,
    Quit,
}

impl FromStr for Move {
    type Err = anyhow::Error;

    /// `r x y`, `f x y`, `n` or `q`.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            bail!("Empty move");
        };

        let mut cell = || -> anyhow::Result<CellId> {
            let mut coord = |axis: &str| -> anyhow::Result<Coord> {
                words
                    .next()
                    .with_context(|| format!("Missing {axis} coordinate"))?
                    .parse()
                    .with_context(|| format!("Invalid {axis} coordinate"))
            };
            let x = coord("x")?;
            let y = coord("y")?;
            Ok(CellId::new(x, y))
        };

        Ok(match verb {
            "r" | "reveal" => Self::Reveal(cell()?),
            "f" | "flag" => Self::Flag(cell()?),
            "n" | "new" => Self::Restart,
            "q" | "quit" => Self::Quit,
            other => bail!("Unknown move {other:?}, expected r, f, n or q"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_moves() {
        assert_eq!("r 3 4".parse::<Move>().unwrap(), Move::Reveal(CellId::new(3, 4)));
        assert_eq!(" flag 0 7 ".parse::<Move>().unwrap(), Move::Flag(CellId::new(0, 7)));
        assert_eq!("q".parse::<Move>().unwrap(), Move::Quit);
    }

    #[test]
    fn rejects_bad_moves() {
        assert!("".parse::<Move>().is_err());
        assert!("r 3".parse::<Move>().is_err());
        assert!("r 3 -1".parse::<Move>().is_err());
        assert!("x 1 1".parse::<Move>().is_err());
    }
}
