//! Pipe maze: a loop of pipes through a grid, with an unknown tile under `S`.

use std::fmt;
use std::ops::Index;

use itertools::Itertools;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MazeError {
    #[error("maze has no start tile")]
    MissingStart,
    #[error("unknown tile {0:?} at row {1}, column {2}")]
    UnknownTile(char, usize, usize),
    #[error("start tile {0} does not join two neighbouring pipes")]
    InvalidStart(Tile),
    #[error("pipe at row {0}, column {1} leads out of the loop")]
    NotALoop(usize, usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dir {North, East, South, West}

impl Dir {
    fn opposite(self) -> Dir {
        match self {
            Dir::North => Dir::South, Dir::East => Dir::West,
            Dir::South => Dir::North, Dir::West => Dir::East,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tile {
    Vertical,
    Horizontal,
    NorthEast,
    NorthWest,
    SouthWest,
    SouthEast,
    Ground,
    Start,
}

impl Tile {
    /// Every pipe that could be hiding under the start marker.
    pub const PIPES: [Tile; 6] = [
        Tile::Vertical, Tile::Horizontal,
        Tile::NorthEast, Tile::NorthWest, Tile::SouthWest, Tile::SouthEast,
    ];

    fn from_char(ch: char) -> Option<Tile> {
        Some(match ch {
            '|' => Tile::Vertical, '-' => Tile::Horizontal,
            'L' => Tile::NorthEast, 'J' => Tile::NorthWest,
            '7' => Tile::SouthWest, 'F' => Tile::SouthEast,
            '.' => Tile::Ground, 'S' => Tile::Start,
            _ => return None
        })
    }

    fn exits(self) -> Option<[Dir; 2]> {
        match self {
            Tile::Vertical => Some([Dir::North, Dir::South]),
            Tile::Horizontal => Some([Dir::West, Dir::East]),
            Tile::NorthEast => Some([Dir::North, Dir::East]),
            Tile::NorthWest => Some([Dir::North, Dir::West]),
            Tile::SouthWest => Some([Dir::South, Dir::West]),
            Tile::SouthEast => Some([Dir::South, Dir::East]),
            Tile::Ground | Tile::Start => None,
        }
    }

    fn connects(self, dir: Dir) -> bool {
        self.exits().is_some_and(|exits| exits.contains(&dir))
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let symbol = match self {
            Tile::Vertical => '|', Tile::Horizontal => '-',
            Tile::NorthEast => 'L', Tile::NorthWest => 'J',
            Tile::SouthWest => '7', Tile::SouthEast => 'F',
            Tile::Ground => '.', Tile::Start => 'S',
        };
        write!(f, "{}", symbol)
    }
}

type Pos = (usize, usize);

pub struct Maze {
    tiles: Vec<Vec<Tile>>,
    start: Pos,
}

impl Index<Pos> for Maze {
    type Output = Tile;
    fn index(&self, (ri, ci): Pos) -> &Tile {
        &self.tiles[ri][ci]
    }
}

impl Maze {
    pub fn parse(input: &str) -> Result<Maze, MazeError> {
        let mut start = None;
        let tiles = input.trim().lines().enumerate().map(|(ri, line)| {
            line.chars().enumerate().map(|(ci, ch)| {
                let tile = Tile::from_char(ch).ok_or(MazeError::UnknownTile(ch, ri, ci))?;
                if tile == Tile::Start {start = Some((ri, ci))};
                Ok(tile)
            }).collect::<Result<Vec<_>, _>>()
        }).collect::<Result<Vec<_>, _>>()?;
        let start = start.ok_or(MazeError::MissingStart)?;
        Ok(Maze {tiles, start})
    }

    fn step(&self, (ri, ci): Pos, dir: Dir) -> Option<Pos> {
        let next = match dir {
            Dir::North => (ri.checked_sub(1)?, ci),
            Dir::East => (ri, ci + 1),
            Dir::South => (ri + 1, ci),
            Dir::West => (ri, ci.checked_sub(1)?),
        };
        self.tiles.get(next.0).and_then(|row| row.get(next.1)).map(|_| next)
    }

    /// Walks the loop assuming `start_tile` sits under the start marker and
    /// returns every position on it, beginning with the start.
    pub fn explore(&self, start_tile: Tile) -> Result<Vec<Pos>, MazeError> {
        let exits = start_tile.exits().ok_or(MazeError::InvalidStart(start_tile))?;
        for dir in exits {
            let joined = self.step(self.start, dir).is_some_and(|next| self[next].connects(dir.opposite()));
            if !joined {return Err(MazeError::InvalidStart(start_tile))};
        }

        let mut path = vec![self.start];
        let mut pos = self.start;
        let mut dir = exits[0];
        loop {
            let next = self.step(pos, dir).ok_or(MazeError::NotALoop(pos.0, pos.1))?;
            let entered_from = dir.opposite();
            if next == self.start {
                return if start_tile.connects(entered_from) {Ok(path)} else {Err(MazeError::NotALoop(pos.0, pos.1))};
            }
            let tile = self[next];
            let [a, b] = tile.exits()
                .filter(|_| tile.connects(entered_from))
                .ok_or(MazeError::NotALoop(next.0, next.1))?;
            dir = if a == entered_from {b} else {a};
            path.push(next);
            pos = next;
        }
    }
}

/// Number of grid cells strictly inside a closed loop of unit steps,
/// by the shoelace formula and Pick's theorem.
pub fn enclosed(path: &[Pos]) -> usize {
    if path.len() < 4 {return 0};
    let twice_area = path.iter().circular_tuple_windows().map(|(&(r1, c1), &(r2, c2))|
        r1 as i64 * c2 as i64 - r2 as i64 * c1 as i64
    ).sum::<i64>().unsigned_abs() as usize;
    (twice_area + 2 - path.len()) / 2
}
