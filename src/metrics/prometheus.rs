use std::fmt::Write;

use super::{RouteReport, Snapshot};

/// Content type for the Prometheus text exposition format.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4";

const STATUS_GROUPS: [&str; 5] = ["2xx", "3xx", "4xx", "5xx", "429"];

/// Escape a label value: backslash first, then double quote.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Gauges are always numeric: unknown percentiles render as 0.
fn format_value(v: Option<f64>) -> String {
    match v {
        None => "0".to_owned(),
        Some(v) if v.is_nan() => "NaN".to_owned(),
        Some(v) if v == f64::INFINITY => "+Inf".to_owned(),
        Some(v) if v == f64::NEG_INFINITY => "-Inf".to_owned(),
        Some(v) => v.to_string(),
    }
}

fn labels(report: &RouteReport) -> String {
    format!(
        "method=\"{}\",path=\"{}\"",
        escape_label(&report.method),
        escape_label(&report.path)
    )
}

fn header(out: &mut String, name: &str, kind: &str, help: &str) {
    let _ = writeln!(out, "# HELP {name} {help}");
    let _ = writeln!(out, "# TYPE {name} {kind}");
}

/// Render a snapshot in Prometheus text exposition format.
///
/// Each metric family is written contiguously; within a family routes
/// follow the snapshot's first-seen order.
pub fn render_prometheus_text(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    let routes: Vec<(String, &RouteReport)> = snapshot
        .routes
        .iter()
        .map(|(_, report)| (labels(report), report))
        .collect();

    header(&mut out, "route_requests_total", "counter", "Total requests per route.");
    for (labels, report) in &routes {
        let _ = writeln!(out, "route_requests_total{{{labels}}} {}", report.counters.total);
    }

    header(
        &mut out,
        "route_requests_status_total",
        "counter",
        "Requests per route by status group (429 is also counted in 4xx).",
    );
    for (labels, report) in &routes {
        let c = &report.counters;
        let values = [c.s2xx, c.s3xx, c.s4xx, c.s5xx, c.s429];
        for (group, value) in STATUS_GROUPS.iter().zip(values) {
            let _ = writeln!(
                out,
                "route_requests_status_total{{{labels},status_group=\"{group}\"}} {value}"
            );
        }
    }

    let gauges: [(&str, &str, fn(&RouteReport) -> Option<f64>); 3] = [
        ("route_requests_latency_ms_p50", "p50", |r| r.p50),
        ("route_requests_latency_ms_p95", "p95", |r| r.p95),
        ("route_requests_latency_ms_p99", "p99", |r| r.p99),
    ];
    for (name, rank, pick) in gauges {
        let help = format!("Latency {rank} in milliseconds over the most recent requests.");
        header(&mut out, name, "gauge", &help);
        for (labels, report) in &routes {
            let _ = writeln!(out, "{name}{{{labels}}} {}", format_value(pick(report)));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{Counters, RouteTable};
    use chrono::Utc;

    fn report(method: &str, path: &str) -> RouteReport {
        RouteReport {
            method: method.into(),
            path: path.into(),
            counters: Counters::default(),
            p50: None,
            p95: None,
            p99: None,
            latencies_small: Vec::new(),
        }
    }

    fn snapshot(reports: Vec<RouteReport>) -> Snapshot {
        let entries = reports
            .into_iter()
            .map(|r| (format!("{} {}", r.method, r.path), r))
            .collect();
        Snapshot {
            generated_at: Utc::now(),
            routes: RouteTable::new(entries),
        }
    }

    fn ping() -> Snapshot {
        let mut r = report("GET", "/ping");
        r.counters = Counters { total: 3, s2xx: 3, ..Counters::default() };
        r.p50 = Some(12.0);
        r.p95 = Some(15.0);
        r.p99 = Some(20.0);
        snapshot(vec![r])
    }

    #[test]
    fn renders_known_snapshot() {
        let text = render_prometheus_text(&ping());
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines.contains(&r#"route_requests_total{method="GET",path="/ping"} 3"#));
        assert!(lines.contains(&r#"route_requests_latency_ms_p50{method="GET",path="/ping"} 12"#));
        assert!(lines.contains(&r#"route_requests_latency_ms_p95{method="GET",path="/ping"} 15"#));
        assert!(lines.contains(&r#"route_requests_latency_ms_p99{method="GET",path="/ping"} 20"#));
        assert!(lines.contains(
            &r#"route_requests_status_total{method="GET",path="/ping",status_group="2xx"} 3"#
        ));
        assert!(lines.contains(
            &r#"route_requests_status_total{method="GET",path="/ping",status_group="429"} 0"#
        ));
    }

    #[test]
    fn every_family_has_help_and_type() {
        let text = render_prometheus_text(&ping());
        for (name, kind) in [
            ("route_requests_total", "counter"),
            ("route_requests_status_total", "counter"),
            ("route_requests_latency_ms_p50", "gauge"),
            ("route_requests_latency_ms_p95", "gauge"),
            ("route_requests_latency_ms_p99", "gauge"),
        ] {
            assert!(text.contains(&format!("# HELP {name} ")), "{name} help");
            assert!(text.contains(&format!("# TYPE {name} {kind}\n")), "{name} type");
        }
    }

    #[test]
    fn label_values_are_escaped() {
        let text = render_prometheus_text(&snapshot(vec![report("GET", r#"/a"b\c"#)]));
        assert!(text.contains(r#"route_requests_total{method="GET",path="/a\"b\\c"} 0"#));
    }

    #[test]
    fn unknown_percentiles_render_as_zero() {
        let text = render_prometheus_text(&snapshot(vec![report("POST", "/empty")]));
        assert!(text.contains(r#"route_requests_latency_ms_p99{method="POST",path="/empty"} 0"#));
    }

    #[test]
    fn fractional_and_non_finite_values() {
        assert_eq!(format_value(Some(12.5)), "12.5");
        assert_eq!(format_value(Some(f64::INFINITY)), "+Inf");
        assert_eq!(format_value(Some(f64::NAN)), "NaN");
    }

    #[test]
    fn routes_follow_snapshot_order() {
        let text = render_prometheus_text(&snapshot(vec![report("GET", "/z"), report("GET", "/a")]));
        let z = text.find(r#"route_requests_total{method="GET",path="/z"}"#).unwrap();
        let a = text.find(r#"route_requests_total{method="GET",path="/a"}"#).unwrap();
        assert!(z < a);
    }

    #[test]
    fn empty_snapshot_renders_headers_only() {
        let text = render_prometheus_text(&snapshot(Vec::new()));
        assert!(text.lines().all(|l| l.starts_with('#')));
    }
}
