//! Seed almanac: chains of piecewise-linear interval maps.
//!
//! Each map sends `[source, source + length)` onto
//! `[destination, destination + length)` and leaves everything else alone.
//! A [`Pipeline`] threads one value through every map in order, and
//! [`reverse_search`] walks it backwards to find the lowest location that
//! some seed range reaches.

use std::ops::Range;

use itertools::Itertools;
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AlmanacError {
    #[error("almanac does not start with a `seeds:` line")]
    MissingSeeds,
    #[error("cannot parse map entry {0:?}")]
    BadEntry(String),
    #[error("seed {0} has no range length")]
    UnpairedSeed(u64),
    #[error("no location maps back into any seed range")]
    NoLocation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entry {
    pub destination: u64,
    pub source: u64,
    pub length: u64,
}

impl Entry {
    fn map(&self, value: u64) -> Option<u64> {
        value.checked_sub(self.source)
             .filter(|&offset| offset < self.length)
             .map(|offset| self.destination + offset)
    }

    fn unmap(&self, value: u64) -> Option<u64> {
        value.checked_sub(self.destination)
             .filter(|&offset| offset < self.length)
             .map(|offset| self.source + offset)
    }

    fn destinations(&self) -> Range<u64> {
        self.destination .. self.destination + self.length
    }
}

#[derive(Clone, Debug)]
pub struct IntervalMap {
    pub name: String,
    entries: Vec<Entry>,
}

impl IntervalMap {
    /// Entries keep their declaration order; the first matching one wins.
    /// When no entry lands on 0, an identity entry covering
    /// `[0, lowest destination)` is appended.
    pub fn new(name: impl Into<String>, mut entries: Vec<Entry>) -> IntervalMap {
        let lowest = entries.iter().map(|entry| entry.destination).min();
        if let Some(lowest) = lowest.filter(|&lowest| lowest > 0) {
            entries.push(Entry {destination: 0, source: 0, length: lowest});
        }
        IntervalMap {name: name.into(), entries}
    }

    /// Parses a block such as `seed-to-soil map:` followed by
    /// `destination source length` lines.
    pub fn parse(block: &str) -> Result<IntervalMap, AlmanacError> {
        let mut lines = block.trim().lines();
        let header = lines.next().unwrap_or_default();
        let name = header.strip_suffix(" map:").unwrap_or(header);
        let entries = lines.map(|line| {
            let numbers = line.split_whitespace().map(str::parse::<u64>).collect::<Result<Vec<_>, _>>();
            match numbers.as_deref() {
                Ok(&[destination, source, length]) => Ok(Entry {destination, source, length}),
                _ => Err(AlmanacError::BadEntry(line.to_owned()))
            }
        }).collect::<Result<Vec<_>, _>>()?;
        Ok(IntervalMap::new(name, entries))
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn convert(&self, value: u64) -> u64 {
        self.entries.iter().find_map(|entry| entry.map(value)).unwrap_or(value)
    }

    pub fn reverse_convert(&self, value: u64) -> u64 {
        self.entries.iter().find_map(|entry| entry.unmap(value)).unwrap_or(value)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    maps: Vec<IntervalMap>,
}

impl Pipeline {
    pub fn new(maps: Vec<IntervalMap>) -> Pipeline {
        Pipeline {maps}
    }

    pub fn maps(&self) -> &[IntervalMap] {
        &self.maps
    }

    pub fn resolve(&self, seed: u64) -> u64 {
        self.maps.iter().fold(seed, |value, map| map.convert(value))
    }

    pub fn reverse_resolve(&self, location: u64) -> u64 {
        self.maps.iter().rev().fold(location, |value, map| map.reverse_convert(value))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeedRange {
    pub start: u64,
    pub length: u64,
}

impl SeedRange {
    pub fn contains(&self, seed: u64) -> bool {
        seed.checked_sub(self.start).is_some_and(|offset| offset < self.length)
    }
}

/// Parsed almanac: the listed seed numbers and the maps between categories.
#[derive(Clone, Debug)]
pub struct Almanac {
    pub seeds: Vec<u64>,
    pub pipeline: Pipeline,
}

impl Almanac {
    pub fn parse(input: &str) -> Result<Almanac, AlmanacError> {
        let input = input.replace("\r\n", "\n");
        let mut blocks = input.trim().split("\n\n");
        let seeds = blocks.next()
            .and_then(|line| line.strip_prefix("seeds:"))
            .ok_or(AlmanacError::MissingSeeds)?;
        let seeds = seeds.split_whitespace()
            .map(|seed| seed.parse().map_err(|_| AlmanacError::BadEntry(seed.to_owned())))
            .collect::<Result<Vec<_>, _>>()?;
        let maps = blocks.map(IntervalMap::parse).collect::<Result<Vec<_>, _>>()?;
        Ok(Almanac {seeds, pipeline: Pipeline::new(maps)})
    }

    /// Reads the seed list as `start length` pairs.
    pub fn seed_ranges(&self) -> Result<Vec<SeedRange>, AlmanacError> {
        self.seeds.chunks(2).map(|pair| match *pair {
            [start, length] => Ok(SeedRange {start, length}),
            _ => Err(AlmanacError::UnpairedSeed(pair[0]))
        }).collect()
    }
}

/// Splits `[0, ceiling)` into ascending, disjoint batches: the last map's
/// destination ranges and the gaps between them, which pass through that
/// map unchanged.
///
/// A location at or above every destination end of every map reverse
/// resolves to itself, so past the highest seed it cannot hit; `ceiling`
/// is the largest of those ends.
fn location_batches(pipeline: &Pipeline, seeds: &[SeedRange]) -> Vec<Range<u64>> {
    let ceiling = pipeline.maps.iter()
        .flat_map(|map| map.entries.iter().map(|entry| entry.destinations().end))
        .chain(seeds.iter().map(|range| range.start + range.length))
        .max()
        .unwrap_or(0);
    let ranges: Vec<Range<u64>> = pipeline.maps.last()
        .map(|last| last.entries.iter().map(Entry::destinations).sorted_by_key(|range| range.start).collect())
        .unwrap_or_else(Vec::new);

    let mut batches = Vec::with_capacity(2 * ranges.len() + 1);
    let mut covered = 0;
    for range in ranges {
        if covered < range.start {batches.push(covered .. range.start)};
        let start = range.start.max(covered);
        if start < range.end {batches.push(start .. range.end)};
        covered = covered.max(range.end);
    }
    if covered < ceiling {batches.push(covered .. ceiling)};
    batches
}

/// Finds the lowest location whose reverse-resolved seed lies in one of
/// `seeds`, together with the range it fell into.
///
/// Batches from `location_batches` are scanned in ascending order, each
/// in parallel; `find_map_first` stops handing out higher candidates once a
/// lower hit is known, and later batches are never started after a hit.
#[instrument(skip_all, fields(seed_ranges = seeds.len()))]
pub fn reverse_search(pipeline: &Pipeline, seeds: &[SeedRange]) -> Option<(u64, SeedRange)> {
    for batch in location_batches(pipeline, seeds) {
        debug!(start = batch.start, end = batch.end, "scanning locations");
        let hit = batch.into_par_iter().find_map_first(|location| {
            let seed = pipeline.reverse_resolve(location);
            seeds.iter().find(|range| range.contains(seed)).map(|&range| (location, range))
        });
        if hit.is_some() {
            return hit;
        }
    }
    None
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    pub(crate) const EXAMPLE: &str = "seeds: 79 14 55 13

seed-to-soil map:
50 98 2
52 50 48

soil-to-fertilizer map:
0 15 37
37 52 2
39 0 15

fertilizer-to-water map:
49 53 8
0 11 42
42 0 7
57 7 4

water-to-light map:
88 18 7
18 25 70

light-to-temperature map:
45 77 23
81 45 19
68 64 13

temperature-to-humidity map:
0 69 1
1 0 69

humidity-to-location map:
60 56 37
56 93 4
";

    fn seed_to_soil() -> IntervalMap {
        IntervalMap::new("seed-to-soil", vec![
            Entry {destination: 50, source: 98, length: 2},
            Entry {destination: 52, source: 50, length: 48},
        ])
    }

    #[test]
    fn synthesizes_identity_below_lowest_destination() {
        let map = seed_to_soil();
        assert_eq!(map.entries().last(), Some(&Entry {destination: 0, source: 0, length: 50}));

        let grounded = IntervalMap::new("grounded", vec![Entry {destination: 0, source: 10, length: 5}]);
        assert_eq!(grounded.entries().len(), 1);
    }

    #[test]
    fn converts_through_single_map() {
        let map = seed_to_soil();
        assert_eq!(map.convert(79), 81);
        assert_eq!(map.convert(14), 14);
        assert_eq!(map.convert(55), 57);
        assert_eq!(map.convert(98), 50);
        assert_eq!(map.convert(100), 100);

        assert_eq!(map.reverse_convert(81), 79);
        assert_eq!(map.reverse_convert(14), 14);
        assert_eq!(map.reverse_convert(57), 55);
    }

    #[test]
    fn first_declared_entry_wins() {
        let map = IntervalMap::new("overlap", vec![
            Entry {destination: 100, source: 0, length: 10},
            Entry {destination: 200, source: 5, length: 10},
        ]);
        assert_eq!(map.convert(7), 107);
        assert_eq!(map.convert(12), 207);
    }

    #[test]
    fn two_stage_pipeline_composes() {
        let almanac = Almanac::parse(EXAMPLE).unwrap();
        let pipeline = Pipeline::new(almanac.pipeline.maps()[.. 2].to_vec());
        let fertilizers = [79, 14, 55, 13].map(|seed| pipeline.resolve(seed));
        assert_eq!(fertilizers, [81, 53, 57, 52]);

        let [soil, fertilizer] = [&pipeline.maps()[0], &pipeline.maps()[1]];
        for seed in 0 .. 120 {
            assert_eq!(pipeline.resolve(seed), fertilizer.convert(soil.convert(seed)));
        }
    }

    #[test]
    fn parses_example() {
        let almanac = Almanac::parse(EXAMPLE).unwrap();
        assert_eq!(almanac.seeds, [79, 14, 55, 13]);
        let names = almanac.pipeline.maps().iter().map(|map| map.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names.first(), Some(&"seed-to-soil"));
        assert_eq!(names.last(), Some(&"humidity-to-location"));
        assert_eq!(names.len(), 7);
        assert_eq!(almanac.seed_ranges().unwrap(), [
            SeedRange {start: 79, length: 14},
            SeedRange {start: 55, length: 13},
        ]);
    }

    #[test]
    fn example_locations() {
        let almanac = Almanac::parse(EXAMPLE).unwrap();
        let locations = almanac.seeds.iter().map(|&seed| almanac.pipeline.resolve(seed)).collect::<Vec<_>>();
        assert_eq!(locations, [82, 43, 86, 35]);
    }

    #[test]
    fn reverse_search_finds_example_minimum() {
        let almanac = Almanac::parse(EXAMPLE).unwrap();
        let found = reverse_search(&almanac.pipeline, &almanac.seed_ranges().unwrap());
        assert_eq!(found, Some((46, SeedRange {start: 79, length: 14})));
    }

    #[test]
    fn reverse_search_scans_gaps_and_beyond() {
        let swap = IntervalMap::new("swap", vec![
            Entry {destination: 0, source: 20, length: 10},
            Entry {destination: 20, source: 0, length: 10},
        ]);
        let pipeline = Pipeline::new(vec![swap]);

        let between = SeedRange {start: 10, length: 5};
        assert_eq!(reverse_search(&pipeline, &[between]), Some((10, between)));

        let above = SeedRange {start: 100, length: 5};
        assert_eq!(reverse_search(&pipeline, &[above]), Some((100, above)));

        let swapped = SeedRange {start: 25, length: 2};
        assert_eq!(reverse_search(&pipeline, &[above, swapped]), Some((5, swapped)));
    }

    #[test]
    fn batches_cover_everything_below_ceiling() {
        let pipeline = Pipeline::new(vec![seed_to_soil()]);
        let seeds = [SeedRange {start: 1000, length: 5}];
        assert_eq!(location_batches(&pipeline, &seeds), [0 .. 50, 50 .. 52, 52 .. 100, 100 .. 1005]);
        assert_eq!(reverse_search(&pipeline, &seeds), Some((1000, seeds[0])));
        assert_eq!(reverse_search(&Pipeline::default(), &seeds), Some((1000, seeds[0])));
    }

    #[test]
    fn reverse_search_reports_exhaustion() {
        // 2 resolves to itself, but reverse resolution sends 0 .. 5 to 10 .. 15.
        let lossy = IntervalMap::new("lossy", vec![Entry {destination: 0, source: 10, length: 5}]);
        let pipeline = Pipeline::new(vec![lossy]);
        assert_eq!(reverse_search(&pipeline, &[SeedRange {start: 2, length: 1}]), None);
        assert_eq!(reverse_search(&pipeline, &[]), None);
    }

    #[test]
    fn odd_seed_count_is_an_error() {
        let almanac = Almanac::parse("seeds: 79 14 55

a-to-b map:
1 2 3").unwrap();
        assert_eq!(
            almanac.seed_ranges().unwrap_err(),
            AlmanacError::UnpairedSeed(55)
        );
        assert_eq!(AlmanacError::UnpairedSeed(55).to_string(), "seed 55 has no range length");
    }

    #[test]
    fn rejects_malformed_almanac() {
        assert_eq!(Almanac::parse("soil: 1 2").unwrap_err(), AlmanacError::MissingSeeds);
        assert_eq!(
            Almanac::parse("seeds: 1 2\n\na-to-b map:\n1 2").unwrap_err(),
            AlmanacError::BadEntry("1 2".to_owned())
        );
    }

    /// Source blocks laid end to end from `base`, destinations the same
    /// blocks in `order`: a bijection on `[base, base + total)`.
    fn block_entries(base: u64, lengths: &[u64], order: &[usize]) -> Vec<Entry> {
        let sources = lengths.iter().scan(base, |at, &length| {
            let start = *at;
            *at += length;
            Some(start)
        }).collect::<Vec<_>>();
        let mut destinations = vec![0; lengths.len()];
        let mut at = base;
        for &block in order {
            destinations[block] = at;
            at += lengths[block];
        }
        (0 .. lengths.len()).map(|block| Entry {
            destination: destinations[block],
            source: sources[block],
            length: lengths[block],
        }).collect()
    }

    fn permuting_map() -> impl Strategy<Value = (IntervalMap, u64)> {
        (0u64 .. 60, prop::collection::vec(1u64 .. 20, 1 .. 6))
            .prop_flat_map(|(base, lengths)| {
                let order = Just((0 .. lengths.len()).collect::<Vec<_>>()).prop_shuffle();
                (Just(base), Just(lengths), order)
            })
            .prop_map(|(base, lengths, order)| {
                let end = base + lengths.iter().sum::<u64>();
                (IntervalMap::new("permutation", block_entries(base, &lengths, &order)), end)
            })
    }

    /// Several permuted segments separated by holes that no entry touches.
    fn holey_map() -> impl Strategy<Value = IntervalMap> {
        prop::collection::vec((1u64 .. 30, prop::collection::vec(1u64 .. 10, 1 .. 4)), 1 .. 4)
            .prop_flat_map(|segments| {
                let orders = segments.iter()
                    .map(|(_, lengths)| Just((0 .. lengths.len()).collect::<Vec<_>>()).prop_shuffle())
                    .collect::<Vec<_>>();
                (Just(segments), orders)
            })
            .prop_map(|(segments, orders)| {
                let mut entries = Vec::new();
                let mut at = 0u64;
                for ((hole, lengths), order) in segments.iter().zip(&orders) {
                    at += hole;
                    entries.extend(block_entries(at, lengths, order));
                    at += lengths.iter().sum::<u64>();
                }
                IntervalMap::new("holes", entries)
            })
    }

    fn seed_ranges() -> impl Strategy<Value = Vec<SeedRange>> {
        prop::collection::vec((0u64 .. 300, 1u64 .. 10), 1 .. 4)
            .prop_map(|ranges| ranges.into_iter().map(|(start, length)| SeedRange {start, length}).collect())
    }

    /// Lowest location over every seed, resolved forwards.
    fn forward_minimum(pipeline: &Pipeline, seeds: &[SeedRange]) -> Option<u64> {
        seeds.iter()
            .flat_map(|range| range.start .. range.start + range.length)
            .map(|seed| pipeline.resolve(seed))
            .min()
    }

    proptest! {
        #[test]
        fn reverse_resolve_inverts_resolve(
            (first, _) in permuting_map(),
            (second, _) in permuting_map(),
            seed in 0u64 .. 200,
        ) {
            let pipeline = Pipeline::new(vec![first, second]);
            prop_assert_eq!(pipeline.reverse_resolve(pipeline.resolve(seed)), seed);
        }

        #[test]
        fn unmapped_values_pass_through((map, end) in permuting_map(), past in 0u64 .. 1000) {
            let value = end + past;
            prop_assert_eq!(map.convert(value), value);
            prop_assert_eq!(map.reverse_convert(value), value);
        }

        #[test]
        fn entries_shift_their_range((map, _) in permuting_map(), offset in 0u64 .. 20) {
            for entry in map.entries() {
                if offset < entry.length {
                    let converted = map.convert(entry.source + offset);
                    prop_assert_eq!(converted, entry.destination + offset);
                    prop_assert!(entry.destinations().contains(&converted));
                }
            }
        }

        #[test]
        fn reverse_search_finds_global_minimum(
            (first, _) in permuting_map(),
            (second, _) in permuting_map(),
            seeds in seed_ranges(),
        ) {
            let pipeline = Pipeline::new(vec![first, second]);
            let found = reverse_search(&pipeline, &seeds);
            prop_assert_eq!(found.map(|(location, _)| location), forward_minimum(&pipeline, &seeds));
            if let Some((location, range)) = found {
                prop_assert!(range.contains(pipeline.reverse_resolve(location)));
            }
        }

        #[test]
        fn reverse_search_crosses_holes(first in holey_map(), second in holey_map(), seeds in seed_ranges()) {
            let pipeline = Pipeline::new(vec![first, second]);
            let found = reverse_search(&pipeline, &seeds);
            prop_assert_eq!(found.map(|(location, _)| location), forward_minimum(&pipeline, &seeds));
            if let Some((location, range)) = found {
                prop_assert!(range.contains(pipeline.reverse_resolve(location)));
            }
        }
    }
}
