use std::path::PathBuf;
use std::time::Instant;

use anyhow::{anyhow, bail, Context, Result};
use itertools::Itertools;
use regex::Regex;
use rustc_hash::FxHashMap;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn parse_row(line: &str) -> Result<Vec<i64>> {
    line.split_whitespace()
        .map(|n| n.parse::<i64>().with_context(|| format!("cannot parse {:?} in {:?}", n, line)))
        .collect()
}

fn day1(part: u8, input: &str) -> Result<String> {
    let pairs = input.trim().lines().map(|line| {
        let row = parse_row(line)?;
        match row[..] {
            [left, right] => Ok((left, right)),
            _ => bail!("expected two numbers in {:?}", line)
        }
    }).collect::<Result<Vec<_>>>()?;
    let (mut lefts, mut rights): (Vec<i64>, Vec<i64>) = pairs.into_iter().unzip();

    if part == 1 {
        lefts.sort_unstable();
        rights.sort_unstable();
        Ok(lefts.iter().zip(&rights).map(|(left, right)| (left - right).abs()).sum::<i64>().to_string())
    } else {
        let mut counts = FxHashMap::<i64, i64>::default();
        for &right in &rights {*counts.entry(right).or_default() += 1};
        Ok(lefts.iter().map(|left| left * counts.get(left).copied().unwrap_or(0)).sum::<i64>().to_string())
    }
}

/// Levels all move the same way, each by 1 to 3.
fn is_safe(levels: impl Iterator<Item = i64>) -> bool {
    let mut trend = 0;
    levels.tuple_windows().all(|(a, b)| {
        let step = b - a;
        let same_way = trend == 0 || step.signum() == trend;
        trend = step.signum();
        same_way && (1 ..= 3).contains(&step.abs())
    })
}

fn day2(part: u8, input: &str) -> Result<String> {
    let mut safe = 0;
    for line in input.trim().lines() {
        let levels = parse_row(line)?;
        let tolerated = is_safe(levels.iter().copied()) || part == 2 && (0 .. levels.len()).any(|skip|
            is_safe(levels.iter().enumerate().filter(|&(ix, _)| ix != skip).map(|(_, &level)| level))
        );
        debug!(line, tolerated, "checked report");
        if tolerated {safe += 1};
    }
    Ok(safe.to_string())
}

fn day3(part: u8, input: &str) -> Result<String> {
    let instruction = Regex::new(r"mul\((\d{1,3}),(\d{1,3})\)|do\(\)|don't\(\)")?;
    let (_, total) = instruction.captures_iter(input).try_fold((true, 0u64), |(enabled, total), caps| {
        Ok::<_, anyhow::Error>(match &caps[0] {
            "do()" => (true, total),
            "don't()" => (part == 1, total),
            _ if enabled => (enabled, total + caps[1].parse::<u64>()? * caps[2].parse::<u64>()?),
            _ => (enabled, total),
        })
    })?;
    Ok(total.to_string())
}

type Solver = fn(u8, &str) -> Result<String>;

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
    let days: [Solver; 3] = [day1, day2, day3];
    let solve = config.day.checked_sub(1).and_then(|ix| days.get(ix))
        .ok_or_else(|| anyhow!("no solution for day {}", config.day))?;
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
