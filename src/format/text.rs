//! Human-readable text output formatter

use crate::analytics::ranking::RankedRegion;
use crate::analytics::timeseries::Season;
use crate::analytics::{
    AnalysisOutcome, ClusteringReport, CorrelationReport, ExtremeEventsReport, RankingReport,
    TimeSeriesReport,
};
use crate::error::Result;
use crate::format::{OutputFormatter, Report};
use std::fmt::Write;

/// Text formatter - outputs a human-readable summary
pub struct TextFormatter;

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable summary"
    }

    fn format(&self, report: &Report) -> Result<String> {
        let mut output = String::new();

        let written = match report {
            Report::TimeSeries(outcome) => with_outcome(&mut output, outcome, timeseries),
            Report::Clustering(outcome) => with_outcome(&mut output, outcome, clustering),
            Report::Ranking(report) => ranking(&mut output, report),
            Report::Correlation(outcome) => with_outcome(&mut output, outcome, correlation),
            Report::Extremes(outcome) => with_outcome(&mut output, outcome, extremes),
        };
        written?;

        Ok(output)
    }
}

type Section<T> = fn(&mut String, &T) -> std::fmt::Result;

fn with_outcome<T>(
    out: &mut String,
    outcome: &AnalysisOutcome<T>,
    section: Section<T>,
) -> std::fmt::Result {
    match outcome {
        AnalysisOutcome::Ready(report) => section(out, report),
        AnalysisOutcome::NoData { message } => writeln!(out, "No data: {}", message),
        AnalysisOutcome::InsufficientData { message } => {
            writeln!(out, "Insufficient data: {}", message)
        }
    }
}

fn timeseries(out: &mut String, report: &TimeSeriesReport) -> std::fmt::Result {
    writeln!(out, "Time series: {}, {}", report.district, report.state)?;
    writeln!(out)?;

    for point in &report.time_series {
        writeln!(
            out,
            "  {}-{:02}  {:>9.2} ppb  (n={})",
            point.year, point.month, point.value, point.sample_count
        )?;
    }

    let stats = &report.statistics;
    writeln!(out, "\nStatistics:")?;
    writeln!(out, "  Mean: {:.2}  Median: {:.2}  Std: {:.2}", stats.mean, stats.median, stats.std)?;
    writeln!(out, "  Range: {:.2} - {:.2}", stats.min, stats.max)?;
    writeln!(out, "  CV: {:.2}%", stats.coefficient_of_variation)?;

    writeln!(out, "\nTrend:")?;
    writeln!(
        out,
        "  Overall: {} ({:+.4} ppb/month)",
        report.trends.overall_direction, report.trends.overall_slope
    )?;
    for year in &report.trends.yearly_trends {
        writeln!(out, "  {}: {} ({:+.4})", year.year, year.direction, year.slope)?;
    }

    if let Some(month) = report.peak_month {
        writeln!(out, "\nPeak month: {}", month)?;
    }

    writeln!(out, "\nSeasons:")?;
    for season in [Season::Spring, Season::Summer, Season::Monsoon, Season::Winter] {
        if let Some(summary) = report.seasonal_pattern.get(season) {
            writeln!(
                out,
                "  {:<8} {:>9.2} ppb  (n={})",
                format!("{:?}", season),
                summary.average,
                summary.sample_count
            )?;
        }
    }

    Ok(())
}

fn clustering(out: &mut String, report: &ClusteringReport) -> std::fmt::Result {
    writeln!(out, "Clustering: {} ({} clusters)", report.state, report.n_clusters)?;
    writeln!(
        out,
        "Inertia: {:.2}  Silhouette: {:.2}  Iterations: {}",
        report.inertia, report.silhouette_score, report.iterations
    )?;
    writeln!(out)?;

    for cluster in &report.clusters {
        writeln!(
            out,
            "  Cluster {}: centroid {:.2} ppb, {} districts",
            cluster.cluster_id, cluster.centroid, cluster.size
        )?;
    }
    writeln!(out)?;

    for district in &report.district_clusters {
        writeln!(
            out,
            "  [{}] {:<24} {:>9.2} ppb",
            district.cluster_id, district.district, district.average_value
        )?;
    }

    Ok(())
}

fn ranking(out: &mut String, report: &RankingReport) -> std::fmt::Result {
    writeln!(out, "Ranking for {}", report.period)?;

    writeln!(out, "\nStates ({}):", report.total_states)?;
    ranked_list(out, &report.state_rankings)?;

    writeln!(out, "\nDistricts ({}):", report.total_districts)?;
    ranked_list(out, &report.district_rankings)
}

fn ranked_list(out: &mut String, regions: &[RankedRegion]) -> std::fmt::Result {
    if regions.is_empty() {
        return writeln!(out, "  (none)");
    }
    for region in regions {
        let name = match &region.state {
            Some(state) => format!("{}, {}", region.name, state),
            None => region.name.clone(),
        };
        writeln!(
            out,
            "  {:>3}. {:<32} {:>9.2} ppb  (n={})",
            region.rank, name, region.mean, region.sample_count
        )?;
    }
    Ok(())
}

fn correlation(out: &mut String, report: &CorrelationReport) -> std::fmt::Result {
    writeln!(
        out,
        "Correlation: {} ({} districts, {} pairs)",
        report.state,
        report.matrix.len(),
        report.pairs.len()
    )?;

    writeln!(out, "\nStrongest:")?;
    for pair in &report.strongest {
        writeln!(
            out,
            "  {} / {}: {:+.3} ({} periods)",
            pair.district_a, pair.district_b, pair.coefficient, pair.overlapping_periods
        )?;
    }

    writeln!(out, "\nWeakest:")?;
    for pair in &report.weakest {
        writeln!(
            out,
            "  {} / {}: {:+.3} ({} periods)",
            pair.district_a, pair.district_b, pair.coefficient, pair.overlapping_periods
        )?;
    }

    Ok(())
}

fn extremes(out: &mut String, report: &ExtremeEventsReport) -> std::fmt::Result {
    let stats = &report.statistics;
    writeln!(out, "Extreme events: {}, {}", report.district, report.state)?;
    writeln!(
        out,
        "Threshold: {:.2} ppb (percentile {})",
        stats.threshold_value, stats.threshold_percentile
    )?;
    writeln!(
        out,
        "Events: {} ({:.2}% of samples), max {:.2}, mean {:.2}",
        stats.total_events, stats.event_frequency, stats.max_value, stats.avg_extreme_value
    )?;
    writeln!(out)?;

    for event in &report.extreme_events {
        writeln!(
            out,
            "  {}  {:>9.2} ppb  {:<8} ({:.4}, {:.4})",
            event.date, event.value, event.severity.to_string(), event.latitude, event.longitude
        )?;
    }

    Ok(())
}
