use log::debug;

use std::{collections::HashMap, fmt::Display};

use crate::{
    chart::{Chart, ChartKind, Rgb},
    record::{Dataset, Record},
};

/// Number of platforms shown in the platform report.
pub const TOP_PLATFORMS: usize = 10;
/// Number of genres shown in the genre report.
pub const TOP_GENRES: usize = 5;
/// Number of publishers shown in the publisher report.
pub const TOP_PUBLISHERS: usize = 10;
/// Number of titles shown in the report for the target year.
pub const TOP_TITLES: usize = 10;

/// Regions in reporting order, with their chart colors.
const REGIONS: [(&str, Rgb); 4] = [
    ("North America", Rgb(0xFF, 0x57, 0x33)),
    ("Europe", Rgb(0x33, 0xFF, 0x57)),
    ("Japan", Rgb(0x33, 0x57, 0xFF)),
    ("Other", Rgb(0xFF, 0x33, 0xA1)),
];

/// An ordered list of `(key, total)` pairs produced by one report.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ranking(Vec<(String, f64)>);

impl Ranking {
    #[must_use]
    pub fn entries(&self) -> &[(String, f64)] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the value for `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
    }

    /// Returns the sum of all values in the ranking.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.0.iter().map(|(_, v)| v).sum()
    }

    /// Returns each entry's percentage of [`Ranking::total`].
    ///
    /// Shares are relative to this ranking only, so for a top-N slice they
    /// always add up to 100.
    #[must_use]
    pub fn shares(&self) -> Vec<f64> {
        let total = self.total();
        self.0
            .iter()
            .map(|(_, v)| if total > 0.0 { v / total * 100.0 } else { 0.0 })
            .collect()
    }

    /// Returns a copy sorted by ascending value.
    #[must_use]
    pub fn ascending(&self) -> Self {
        let mut entries = self.0.clone();
        entries.sort_by(|a, b| a.1.total_cmp(&b.1));
        Self(entries)
    }

    fn width(&self) -> usize {
        self.0.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0)
    }
}

/// Prints a ranking with each entry's share of the ranking's total.
struct SharesTable<'a>(&'a Ranking);

impl Display for SharesTable<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ranking = self.0;
        if ranking.is_empty() {
            return Display::fmt(ranking, f);
        }
        let width = ranking.width();
        for ((key, value), share) in ranking.entries().iter().zip(ranking.shares()) {
            writeln!(f, "{key:width$} {value:>10.2} {share:>6.1}%")?;
        }
        Ok(())
    }
}

impl From<Vec<(String, f64)>> for Ranking {
    fn from(entries: Vec<(String, f64)>) -> Self {
        Self(entries)
    }
}

impl Display for Ranking {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return writeln!(f, "(no data)");
        }
        let width = self.width();
        for (key, value) in &self.0 {
            writeln!(f, "{key:width$} {value:>10.2}")?;
        }
        Ok(())
    }
}

/// Sums `value` over the records in each group sharing the same `key`.
///
/// Groups are sorted by descending total. Groups with equal totals stay in
/// the order they were first seen.
pub fn group_totals<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    key: impl Fn(&Record) -> &str,
    value: impl Fn(&Record) -> f64,
) -> Ranking {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<(String, f64)> = Vec::new();
    for record in records {
        let k = key(record);
        let i = *index.entry(k).or_insert_with(|| {
            totals.push((k.to_string(), 0.0));
            totals.len() - 1
        });
        totals[i].1 += value(record);
    }
    totals.sort_by(|a, b| b.1.total_cmp(&a.1));
    Ranking(totals)
}

/// Returns the `n` groups with the largest totals, as [`group_totals`].
///
/// # Examples
///
/// ```
/// # use vgsales::{Dataset, report::top_by};
/// let data = Dataset::from_path("testdata/scenario.csv").unwrap();
/// let top = top_by(data.records(), |r| r.platform.as_str(), |r| r.global_sales, 1);
/// assert_eq!(top.entries(), [("X".to_string(), 8.0)]);
/// ```
pub fn top_by<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    key: impl Fn(&Record) -> &str,
    value: impl Fn(&Record) -> f64,
    n: usize,
) -> Ranking {
    let mut ranking = group_totals(records, key, value);
    ranking.0.truncate(n);
    ranking
}

/// Returns the top platforms by global sales.
#[must_use]
pub fn platform_totals(records: &[Record]) -> Ranking {
    top_by(records, |r| r.platform.as_str(), |r| r.global_sales, TOP_PLATFORMS)
}

/// Returns the top genres by global sales.
#[must_use]
pub fn genre_totals(records: &[Record]) -> Ranking {
    top_by(records, |r| r.genre.as_str(), |r| r.global_sales, TOP_GENRES)
}

/// Returns the top publishers by global sales.
#[must_use]
pub fn publisher_totals(records: &[Record]) -> Ranking {
    top_by(records, |r| r.publisher.as_str(), |r| r.global_sales, TOP_PUBLISHERS)
}

/// Returns total sales for each region over all records, in fixed region
/// order rather than sorted.
#[must_use]
pub fn regional_totals(records: &[Record]) -> Ranking {
    let columns: [fn(&Record) -> f64; 4] = [
        |r| r.na_sales,
        |r| r.eu_sales,
        |r| r.jp_sales,
        |r| r.other_sales,
    ];
    let totals: Vec<(String, f64)> = REGIONS
        .iter()
        .zip(columns)
        .map(|((region, _), column)| ((*region).to_string(), records.iter().map(column).sum()))
        .collect();
    Ranking(totals)
}

/// Returns the best-selling titles released in `year`, combining each
/// title's sales across platforms.
///
/// Returns `None` if no records are from `year`.
#[must_use]
pub fn titles_for_year(records: &[Record], year: i32) -> Option<Ranking> {
    let mut matching = records.iter().filter(|r| r.year == year).peekable();
    matching.peek()?;
    Some(top_by(matching, |r| r.name.as_str(), |r| r.global_sales, TOP_TITLES))
}

/// One part of a [`Report`]: printable text, and a chart if it has one.
#[derive(Debug)]
pub struct Section {
    pub text: String,
    pub chart: Option<Chart>,
}

/// Holds the five sales reports for a dataset.
///
/// To compute a report, use [`Report::build`].
///
/// To get a printable version of the report, use its [`Display`]
/// implementation, or [`Report::sections`] to interleave charts.
#[derive(Debug, Default)]
pub struct Report {
    pub platforms: Ranking,
    pub genres: Ranking,
    pub publishers: Ranking,
    pub regions: Ranking,
    pub year: i32,
    pub titles: Option<Ranking>,
}

impl Report {
    /// Computes every report over `data`, using `year` as the target year
    /// for the best-selling titles report.
    #[must_use]
    pub fn build(data: &Dataset, year: i32) -> Self {
        let records = data.records();
        let report = Self {
            platforms: platform_totals(records),
            genres: genre_totals(records),
            publishers: publisher_totals(records),
            regions: regional_totals(records),
            year,
            titles: titles_for_year(records, year),
        };
        debug!(
            "built report: {} platforms, {} genres, {} publishers, {} titles for {year}",
            report.platforms.len(),
            report.genres.len(),
            report.publishers.len(),
            report.titles.as_ref().map_or(0, Ranking::len),
        );
        report
    }

    /// Returns the report's sections in printing order, each with the chart
    /// drawn for it, if any.
    #[must_use]
    pub fn sections(&self) -> Vec<Section> {
        vec![
            Section {
                text: format!("\n--- Top Platforms by Global Sales ---\n{}", self.platforms),
                chart: Some(self.platform_chart()),
            },
            Section {
                text: format!(
                    "\n--- Top {TOP_GENRES} Genres by Global Sales ---\n{}",
                    SharesTable(&self.genres)
                ),
                chart: Some(self.genre_chart()),
            },
            Section {
                text: format!(
                    "\n--- Top {TOP_PUBLISHERS} Publishers by Global Sales ---\n{}",
                    self.publishers
                ),
                chart: None,
            },
            Section {
                text: format!("\n--- Total Sales by Region ---\n{}", self.regions),
                chart: Some(self.region_chart()),
            },
            Section {
                text: self.titles_text(),
                chart: self.titles_chart(),
            },
        ]
    }

    /// Returns the charts for this report, in order.
    #[must_use]
    pub fn charts(&self) -> Vec<Chart> {
        self.sections().into_iter().filter_map(|s| s.chart).collect()
    }

    fn titles_text(&self) -> String {
        let year = self.year;
        let mut out = format!(
            "\n--- Top {TOP_TITLES} Best-Selling Games of {year} ---\n\
             Analyzing top games from the year: {year}\n"
        );
        match &self.titles {
            Some(titles) => out.push_str(&titles.to_string()),
            None => out.push_str(&format!(
                "No data available for the year {year} to determine trending games.\n"
            )),
        }
        out
    }

    fn platform_chart(&self) -> Chart {
        Chart {
            stem: "top_platforms".into(),
            title: format!("Top {TOP_PLATFORMS} Platforms by Global Sales (in Millions)"),
            x_label: "Platform".into(),
            y_label: "Global Sales (in Millions)".into(),
            kind: ChartKind::Bar {
                color: Rgb::STEEL_BLUE,
                rotate_labels: true,
            },
            entries: self.platforms.entries().to_vec(),
        }
    }

    fn genre_chart(&self) -> Chart {
        Chart {
            stem: "top_genres_pie".into(),
            title: format!("Market Share of Top {TOP_GENRES} Game Genres by Global Sales"),
            x_label: String::new(),
            y_label: String::new(),
            kind: ChartKind::Pie,
            entries: self.genres.entries().to_vec(),
        }
    }

    fn region_chart(&self) -> Chart {
        Chart {
            stem: "regional_sales".into(),
            title: "Total Video Game Sales by Region (in Millions)".into(),
            x_label: "Region".into(),
            y_label: "Sales (in Millions)".into(),
            kind: ChartKind::ColoredBar {
                colors: REGIONS.iter().map(|(_, color)| *color).collect(),
            },
            entries: self.regions.entries().to_vec(),
        }
    }

    fn titles_chart(&self) -> Option<Chart> {
        let titles = self.titles.as_ref()?;
        Some(Chart {
            stem: format!("top_trending_games_{}", self.year),
            title: format!("Top {TOP_TITLES} Best-Selling Games of {}", self.year),
            x_label: "Global Sales (in Millions)".into(),
            y_label: "Game Title".into(),
            kind: ChartKind::HorizontalBar {
                color: Rgb::SEA_GREEN,
            },
            entries: titles.ascending().entries().to_vec(),
        })
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for section in self.sections() {
            write!(f, "{}", section.text)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> Dataset {
        Dataset::from_path("testdata/scenario.csv").unwrap()
    }

    fn sample() -> Dataset {
        Dataset::from_path("testdata/vgsales.csv").unwrap()
    }

    fn assert_close(got: f64, want: f64) {
        assert!((got - want).abs() < 1e-9, "got {got}, want {want}");
    }

    #[test]
    fn platform_totals_fn_sums_global_sales_per_platform() {
        let data = scenario();
        let platforms = platform_totals(data.records());
        assert_eq!(
            platforms,
            Ranking::from(vec![("X".to_string(), 8.0), ("Y".to_string(), 2.0)])
        );
    }

    #[test]
    fn titles_for_year_fn_ranks_titles_from_that_year_only() {
        let data = scenario();
        let titles = titles_for_year(data.records(), 2016).unwrap();
        assert_eq!(
            titles,
            Ranking::from(vec![("A".to_string(), 5.0), ("B".to_string(), 3.0)])
        );
    }

    #[test]
    fn titles_for_year_fn_returns_none_for_year_without_records() {
        let data = scenario();
        assert_eq!(titles_for_year(data.records(), 1985), None);
    }

    #[test]
    fn titles_for_year_fn_combines_title_across_platforms() {
        let data = sample();
        let titles = titles_for_year(data.records(), 2016).unwrap();
        assert_eq!(titles.entries()[0].0, "FIFA 17");
        assert_close(titles.get("FIFA 17").unwrap(), 7.59 + 1.14);
        assert_eq!(
            titles.entries().iter().filter(|(k, _)| k == "FIFA 17").count(),
            1
        );
    }

    #[test]
    fn regional_totals_fn_sums_each_region_in_fixed_order() {
        let data = scenario();
        let regions = regional_totals(data.records());
        let keys: Vec<_> = regions.entries().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["North America", "Europe", "Japan", "Other"]);
        assert_close(regions.get("North America").unwrap(), 6.0);
        assert_close(regions.get("Europe").unwrap(), 2.0);
        assert_close(regions.get("Japan").unwrap(), 1.1);
        assert_close(regions.get("Other").unwrap(), 0.9);
    }

    #[test]
    fn regional_totals_fn_matches_column_sums() {
        let data = sample();
        let regions = regional_totals(data.records());
        let na: f64 = data.records().iter().map(|r| r.na_sales).sum();
        let jp: f64 = data.records().iter().map(|r| r.jp_sales).sum();
        assert_close(regions.get("North America").unwrap(), na);
        assert_close(regions.get("Japan").unwrap(), jp);
    }

    #[test]
    fn group_totals_fn_conserves_global_sales() {
        let data = sample();
        let all = group_totals(data.records(), |r| r.platform.as_str(), |r| r.global_sales);
        let total: f64 = data.records().iter().map(|r| r.global_sales).sum();
        assert_close(all.total(), total);
    }

    #[test]
    fn platform_totals_fn_returns_at_most_ten_distinct_sorted_platforms() {
        let data = sample();
        let platforms = platform_totals(data.records());
        assert_eq!(platforms.len(), TOP_PLATFORMS);
        let entries = platforms.entries();
        assert!(entries.windows(2).all(|w| w[0].1 >= w[1].1), "not sorted");
        for (i, (key, _)) in entries.iter().enumerate() {
            assert!(data.records().iter().any(|r| &r.platform == key));
            assert!(!entries[i + 1..].iter().any(|(k, _)| k == key), "dup {key}");
        }
        assert_eq!(entries[0].0, "Wii");
    }

    #[test]
    fn group_totals_fn_keeps_first_seen_order_for_ties() {
        let records: Vec<Record> = ["B", "Pokémon", "C"]
            .iter()
            .map(|name| Record {
                name: (*name).into(),
                platform: "X".into(),
                year: 2000,
                genre: "G".into(),
                publisher: "P".into(),
                na_sales: 0.0,
                eu_sales: 0.0,
                jp_sales: 0.0,
                other_sales: 0.0,
                global_sales: 1.0,
            })
            .collect();
        let data = Dataset::from_records(records);
        let report = Report::build(&data, 2000);
        let titles = report.titles.unwrap();
        let keys: Vec<_> = titles.entries().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["B", "Pokémon", "C"]);
        assert_eq!(report.platforms.entries(), [("X".to_string(), 3.0)]);
    }

    #[test]
    fn display_fn_aligns_non_ascii_keys() {
        let ranking = Ranking::from(vec![("Pokémon".to_string(), 5.0), ("Halo".to_string(), 3.0)]);
        let text = ranking.to_string();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Pokémon       5.00");
        assert_eq!(lines[1], "Halo          3.00");
        assert_eq!(lines[0].chars().count(), lines[1].chars().count());
    }

    #[test]
    fn shares_fn_sums_to_one_hundred_for_top_genres() {
        let data = sample();
        let genres = genre_totals(data.records());
        assert_eq!(genres.len(), TOP_GENRES);
        assert_close(genres.shares().iter().sum(), 100.0);
    }

    #[test]
    fn ascending_fn_puts_best_seller_last() {
        let ranking = Ranking::from(vec![("A".to_string(), 5.0), ("B".to_string(), 3.0), ("C".to_string(), 1.0)]);
        let keys: Vec<_> = ranking
            .ascending()
            .entries()
            .iter()
            .map(|(k, _)| k.clone())
            .collect();
        assert_eq!(keys, ["C", "B", "A"]);
    }

    #[test]
    fn build_fn_handles_dataset_with_no_records() {
        let data = Dataset::from_path("testdata/no_years.csv").unwrap();
        let report = Report::build(&data, 2016);
        assert!(report.platforms.is_empty());
        assert!(report.genres.is_empty());
        assert!(report.publishers.is_empty());
        assert_eq!(report.regions.len(), 4);
        assert_close(report.regions.total(), 0.0);
        assert_eq!(report.titles, None);
        let text = report.to_string();
        assert!(text.contains("No data available for the year 2016"), "{text}");
        assert_eq!(report.charts().len(), 3, "year chart should be skipped");
    }

    #[test]
    fn charts_fn_describes_each_chart_except_publishers() {
        let report = Report::build(&scenario(), 2016);
        let stems: Vec<_> = report.charts().into_iter().map(|c| c.stem).collect();
        assert_eq!(
            stems,
            [
                "top_platforms",
                "top_genres_pie",
                "regional_sales",
                "top_trending_games_2016"
            ]
        );
    }

    #[test]
    fn charts_fn_orders_title_chart_ascending() {
        let report = Report::build(&scenario(), 2016);
        let chart = report.charts().pop().unwrap();
        assert_eq!(chart.title, "Top 10 Best-Selling Games of 2016");
        assert_eq!(chart.entries, vec![("B".to_string(), 3.0), ("A".to_string(), 5.0)]);
    }

    #[test]
    fn display_fn_prints_sections_in_order() {
        let text = Report::build(&scenario(), 2016).to_string();
        let headers = [
            "--- Top Platforms by Global Sales ---",
            "--- Top 5 Genres by Global Sales ---",
            "--- Top 10 Publishers by Global Sales ---",
            "--- Total Sales by Region ---",
            "--- Top 10 Best-Selling Games of 2016 ---",
        ];
        let positions: Vec<_> = headers.iter().map(|h| text.find(h).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{text}");
        assert!(text.contains("X       8.00"), "{text}");
        assert!(text.contains("G1       7.00   70.0%"), "{text}");
    }
}
