mod almanac;
mod camel;
mod maze;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{anyhow, bail, Context, Result};
use bitvec::prelude::*;
use itertools::Itertools;
use regex::Regex;
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use almanac::{Almanac, AlmanacError};
use camel::Hand;
use maze::{Maze, Tile};

fn gcd(a: u64, b: u64) -> u64 {if b == 0 {a} else {gcd(b, a % b)}}
fn lcm(a: u64, b: u64) -> u64 {a / gcd(a, b) * b}

////////////////////////////////////////////////////////////////////////////////

fn day2(part: u8, input: &str) -> Result<String> {
    let mut total = 0;
    for line in input.trim().lines() {
        let (game, draws) = line.split_once(": ").with_context(|| format!("cannot parse game {:?}", line))?;
        let id = game.trim_start_matches("Game ").parse::<u32>().with_context(|| format!("bad game id in {:?}", line))?;
        let mut most = [0u32; 3];
        for cubes in draws.split([';', ',']) {
            let (count, colour) = cubes.trim().split_once(' ').with_context(|| format!("cannot parse {:?}", cubes))?;
            let slot = match colour {
                "red" => 0, "green" => 1, "blue" => 2,
                _ => bail!("unknown colour {:?} in {:?}", colour, line)
            };
            most[slot] = most[slot].max(count.parse()?);
        }
        total += if part == 1 {
            if most[0] <= 12 && most[1] <= 13 && most[2] <= 14 {id} else {0}
        } else {
            most.iter().product()
        };
    }
    Ok(total.to_string())
}

fn day3(part: u8, input: &str) -> Result<String> {
    let grid = input.trim().lines().map(str::as_bytes).collect::<Vec<_>>();
    let mut part_sum = 0;
    let mut gears: FxHashMap<(usize, usize), Vec<u64>> = FxHashMap::default();
    let number = Regex::new(r"\d+")?;
    for (ri, line) in input.trim().lines().enumerate() {
        for m in number.find_iter(line) {
            let value: u64 = m.as_str().parse()?;
            let symbols = (ri.saturating_sub(1) ..= ri + 1)
                .cartesian_product(m.start().saturating_sub(1) ..= m.end())
                .filter_map(|(r, c)| grid.get(r).and_then(|row| row.get(c)).map(|&cell| (r, c, cell)))
                .filter(|&(_, _, cell)| cell != b'.' && !cell.is_ascii_digit())
                .collect::<Vec<_>>();
            if !symbols.is_empty() {part_sum += value};
            for (r, c, cell) in symbols {
                if cell == b'*' {gears.entry((r, c)).or_default().push(value)};
            }
        }
    }

    if part == 1 {
        Ok(part_sum.to_string())
    } else {
        Ok(gears.values().filter(|parts| parts.len() == 2).map(|parts| parts[0] * parts[1]).sum::<u64>().to_string())
    }
}

fn day4(part: u8, input: &str) -> Result<String> {
    let matches = input.trim().lines().map(|line| {
        let (_, numbers) = line.split_once(':').with_context(|| format!("cannot parse card {:?}", line))?;
        let (winners, have) = numbers.split_once('|').with_context(|| format!("no '|' in card {:?}", line))?;
        let mut winning = bitvec![0; 100];
        for n in winners.split_whitespace() {
            let n: usize = n.parse()?;
            if n >= winning.len() {winning.resize(n + 1, false)};
            winning.set(n, true);
        }
        let matches = have.split_whitespace()
            .map(str::parse::<usize>)
            .fold_ok(0, |count, n| count + winning.get(n).is_some_and(|bit| *bit) as usize)?;
        Ok(matches)
    }).collect::<Result<Vec<usize>>>()?;

    if part == 1 {
        Ok(matches.iter().filter(|&&m| m > 0).map(|&m| 1u64 << (m - 1)).sum::<u64>().to_string())
    } else {
        let mut copies = vec![1u64; matches.len()];
        for (ci, &m) in matches.iter().enumerate() {
            for cj in ci + 1 .. (ci + 1 + m).min(matches.len()) {
                copies[cj] += copies[ci];
            }
        }
        Ok(copies.iter().sum::<u64>().to_string())
    }
}

fn day5(part: u8, input: &str) -> Result<String> {
    let almanac = Almanac::parse(input)?;
    if part == 1 {
        let locations = almanac.seeds.iter().map(|&seed| {
            let location = almanac.pipeline.resolve(seed);
            debug!(seed, location, "resolved seed");
            location
        });
        Ok(locations.min().context("almanac lists no seeds")?.to_string())
    } else {
        let seeds = almanac.seed_ranges()?;
        let (location, range) = almanac::reverse_search(&almanac.pipeline, &seeds).ok_or(AlmanacError::NoLocation)?;
        info!(location, start = range.start, length = range.length, "found seed range");
        Ok(location.to_string())
    }
}

/// Counts hold times `t` with `(time - t) * t > distance`. The winners form
/// a run symmetric around `time / 2`, so only its low end is searched.
fn ways_to_win(time: u64, distance: u64) -> u64 {
    let beats = |t: u64| (time - t) * t > distance;
    let peak = time / 2;
    if !beats(peak) {return 0};
    let half = time as f64 / 2.0;
    let root = half - (half * half - distance as f64).max(0.0).sqrt();
    let mut low = (root.max(0.0) as u64).min(peak);
    while low > 0 && beats(low - 1) {low -= 1};
    while !beats(low) {low += 1};
    time - 2 * low + 1
}

fn day6(part: u8, input: &str) -> Result<String> {
    let rows = input.trim().lines().map(|line| {
        let (_, values) = line.split_once(':').with_context(|| format!("cannot parse {:?}", line))?;
        if part == 1 {
            values.split_whitespace().map(|v| Ok(v.parse::<u64>()?)).collect::<Result<Vec<_>>>()
        } else {
            Ok(vec![values.split_whitespace().collect::<String>().parse::<u64>()?])
        }
    }).collect::<Result<Vec<_>>>()?;
    let [times, distances] = &rows[..] else {bail!("expected a time and a distance line")};
    Ok(times.iter().zip(distances).map(|(&time, &distance)| ways_to_win(time, distance)).product::<u64>().to_string())
}

fn day7(part: u8, input: &str) -> Result<String> {
    let hands = input.trim().lines().map(|line| {
        let (cards, bid) = line.split_once(' ').with_context(|| format!("cannot parse hand {:?}", line))?;
        Ok(Hand::new(cards, bid.parse()?, part == 2)?)
    }).collect::<Result<Vec<_>>>()?;
    Ok(camel::winnings(hands).to_string())
}

fn walk<'a>(
    network: &FxHashMap<&'a str, (&'a str, &'a str)>,
    turns: &[u8],
    start: &'a str,
    is_end: impl Fn(&str) -> bool,
) -> Result<u64> {
    let mut at = start;
    for (step, turn) in (1 ..).zip(turns.iter().cycle()) {
        let &(left, right) = network.get(at).with_context(|| format!("no node {:?}", at))?;
        at = match turn {
            b'L' => left, b'R' => right,
            _ => bail!("unexpected turn {:?}", *turn as char)
        };
        if is_end(at) {return Ok(step)};
    }
    bail!("no turns to follow")
}

fn day8(part: u8, input: &str) -> Result<String> {
    let mut lines = input.trim().lines();
    let turns = lines.next().context("missing turn list")?.trim().as_bytes();
    let node = Regex::new(r"^(\w+) = \((\w+), (\w+)\)$")?;
    let mut network = FxHashMap::default();
    for line in lines.map(str::trim).filter(|line| !line.is_empty()) {
        let (_, [name, left, right]) = node.captures(line).with_context(|| format!("cannot parse node {:?}", line))?.extract();
        network.insert(name, (left, right));
    }

    if part == 1 {
        Ok(walk(&network, turns, "AAA", |at| at == "ZZZ")?.to_string())
    } else {
        network.keys()
            .filter(|name| name.ends_with('A'))
            .map(|&start| walk(&network, turns, start, |at| at.ends_with('Z')))
            .fold_ok(1, lcm)
            .map(|steps| steps.to_string())
    }
}

fn extrapolate(values: &[i64]) -> i64 {
    if values.iter().all(|&v| v == 0) {return 0};
    let diffs = values.iter().tuple_windows().map(|(a, b)| b - a).collect::<Vec<_>>();
    values[values.len() - 1] + extrapolate(&diffs)
}

fn day9(part: u8, input: &str) -> Result<String> {
    input.trim().lines().map(|line| {
        let mut values = line.split_whitespace().map(str::parse).collect::<Result<Vec<i64>, _>>()?;
        if part == 2 {values.reverse()};
        Ok(extrapolate(&values))
    }).sum::<Result<i64>>().map(|sum| sum.to_string())
}

fn day10(part: u8, input: &str) -> Result<String> {
    let maze = Maze::parse(input)?;
    for tile in Tile::PIPES {
        match maze.explore(tile) {
            Ok(path) => {
                info!("took {} steps with start tile {}", path.len(), tile);
                let answer = if part == 1 {path.len() / 2} else {maze::enclosed(&path)};
                return Ok(answer.to_string());
            }
            Err(err) => warn!("invalid tile {}: {}", tile, err),
        }
    }
    Err(anyhow!("no pipe under the start tile closes a loop"))
}

fn tilt_north(grid: &mut [Vec<u8>]) {
    for ci in 0 .. grid.first().map_or(0, Vec::len) {
        let mut free = 0;
        for ri in 0 .. grid.len() {
            match grid[ri][ci] {
                b'#' => free = ri + 1,
                b'O' => {
                    grid[ri][ci] = b'.';
                    grid[free][ci] = b'O';
                    free += 1;
                }
                _ => ()
            }
        }
    }
}

fn rotate_clockwise(grid: &[Vec<u8>]) -> Vec<Vec<u8>> {
    (0 .. grid.first().map_or(0, Vec::len)).map(|ci|
        grid.iter().rev().map(|row| row[ci]).collect()
    ).collect()
}

fn north_load(grid: &[Vec<u8>]) -> usize {
    grid.iter().rev().zip(1 ..).map(|(row, weight)|
        weight * row.iter().filter(|&&cell| cell == b'O').count()
    ).sum()
}

fn day14(part: u8, input: &str) -> Result<String> {
    const SPINS: usize = 1_000_000_000;
    let mut grid = input.trim().lines().map(|line| line.trim().as_bytes().to_vec()).collect::<Vec<_>>();
    if grid.iter().any(|row| row.len() != grid[0].len()) {bail!("platform rows differ in length")};

    if part == 1 {
        tilt_north(&mut grid);
        return Ok(north_load(&grid).to_string());
    }

    let mut seen = FxHashMap::default();
    let mut spin = 0;
    while spin < SPINS {
        if let Some(first) = seen.insert(grid.clone(), spin) {
            let period = spin - first;
            debug!(first, period, "spin cycle repeats");
            spin = SPINS - (SPINS - spin) % period;
            seen.clear();
        }
        if spin == SPINS {break};
        for _ in 0 .. 4 {
            tilt_north(&mut grid);
            grid = rotate_clockwise(&grid);
        }
        spin += 1;
    }
    Ok(north_load(&grid).to_string())
}

fn hash(step: &str) -> usize {
    step.bytes().fold(0, |value, byte| (value + byte as usize) * 17 % 256)
}

fn day15(part: u8, input: &str) -> Result<String> {
    let steps = input.trim().split(',').map(str::trim);
    if part == 1 {
        return Ok(steps.map(hash).sum::<usize>().to_string());
    }

    let mut boxes: Vec<Vec<(&str, usize)>> = vec![vec![]; 256];
    for step in steps {
        if let Some(label) = step.strip_suffix('-') {
            boxes[hash(label)].retain(|&(other, _)| other != label);
        } else {
            let (label, focal) = step.split_once('=').with_context(|| format!("cannot parse step {:?}", step))?;
            let focal = focal.parse()?;
            let lenses = &mut boxes[hash(label)];
            match lenses.iter_mut().find(|(other, _)| *other == label) {
                Some(lens) => lens.1 = focal,
                None => lenses.push((label, focal)),
            }
        }
    }
    Ok(boxes.iter().zip(1 ..).flat_map(|(lenses, box_number)|
        lenses.iter().zip(1 ..).map(move |(&(_, focal), slot)| box_number * slot * focal)
    ).sum::<usize>().to_string())
}

////////////////////////////////////////////////////////////////////////////////

type Solver = fn(u8, &str) -> Result<String>;

fn solver(day: usize) -> Option<Solver> {
    let solve: Solver = match day {
        2 => day2, 3 => day3, 4 => day4, 5 => day5, 6 => day6, 7 => day7,
        8 => day8, 9 => day9, 10 => day10, 14 => day14, 15 => day15,
        _ => return None
    };
    Some(solve)
}

#[derive(Debug, PartialEq)]
struct Config {
    day: usize,
    part: u8,
    input: PathBuf,
}

impl Config {
    /// `<day> <part>` reads `day<day>.in`; `<day> <test> <part>` reads
    /// `day<day>test<test>.in`. `None` means the argument count is wrong.
    fn from_args(args: &[String]) -> Result<Option<Config>> {
        let (day_arg, test_arg, part_arg) = match args {
            [_, day_arg, part_arg] => (day_arg, None, part_arg),
            [_, day_arg, test_arg, part_arg] => (day_arg, Some(test_arg), part_arg),
            _ => return Ok(None)
        };
        let day = day_arg.parse::<usize>().with_context(|| format!("day must be a number, got {:?}", day_arg))?;
        let part = match part_arg.as_str() {
            "1" => 1, "2" => 2,
            _ => bail!("part must be 1 or 2, got {:?}", part_arg)
        };
        let input = match test_arg {
            None => format!("day{}.in", day),
            Some(test) => format!("day{}test{}.in", day, test),
        };
        Ok(Some(Config {day, part, input: input.into()}))
    }
}

fn run(config: &Config) -> Result<String> {
    let solve = solver(config.day).ok_or_else(|| anyhow!("no solution for day {}", config.day))?;
    let input = std::fs::read_to_string(&config.input)
        .with_context(|| format!("cannot read {}", config.input.display()))?;
    info!(input = %config.input.display(), "solving day {} part {}", config.day, config.part);
    let time = Instant::now();
    let answer = solve(config.part, &input)?;
    info!("{} seconds elapsed", time.elapsed().as_secs_f32());
    Ok(answer)
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args = std::env::args().collect::<Vec<_>>();
    let Some(config) = Config::from_args(&args)? else {
        println!("expected two or three arguments - day number, optionally test number and 1/2 for part");
        std::process::exit(1);
    };
    println!("Answer: {}", run(&config)?);
    Ok(())
}
