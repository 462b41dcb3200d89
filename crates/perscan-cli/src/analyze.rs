//! Offline scoring of ad-hoc text.

use std::io::BufRead;

use perscan_sentiment::SentimentAnalyzer;
use serde_json::json;

/// Score `texts`, or every non-blank stdin line when none are given, and print
/// per-text scores plus the batch summary as JSON.
///
/// # Errors
///
/// Returns an error if stdin cannot be read or nothing is left to score.
pub(crate) fn run_analyze(texts: Vec<String>, top: usize) -> anyhow::Result<()> {
    let texts: Vec<String> = if texts.is_empty() {
        read_lines(std::io::stdin().lock())?
    } else {
        texts.into_iter().filter(|t| !t.trim().is_empty()).collect()
    };
    if texts.is_empty() {
        anyhow::bail!("nothing to analyze; pass text arguments or pipe lines on stdin");
    }

    let report = analyze(&texts, top);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn read_lines(reader: impl BufRead) -> std::io::Result<Vec<String>> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if !line.trim().is_empty() {
            lines.push(line);
        }
    }
    Ok(lines)
}

fn analyze(texts: &[String], top: usize) -> serde_json::Value {
    let analyzer = SentimentAnalyzer::new();
    let items: Vec<serde_json::Value> = texts
        .iter()
        .map(|text| {
            let s = analyzer.analyze_text(text);
            json!({
                "text": text,
                "label": s.label(),
                "compound": s.compound,
                "positive": s.positive,
                "negative": s.negative,
                "neutral": s.neutral,
            })
        })
        .collect();
    let summary = analyzer.analyze_texts(texts).with_keyword_limit(top);

    json!({ "texts": items, "summary": summary })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_lines_skips_blank_lines() {
        let input = "first line\n\n   \nsecond line\n";
        let lines = read_lines(input.as_bytes()).unwrap();
        assert_eq!(lines, vec!["first line", "second line"]);
    }

    #[test]
    fn analyze_scores_each_text() {
        let texts = vec![
            "I love this, it is great".to_string(),
            "Terrible update, it crashes constantly".to_string(),
        ];
        let report = analyze(&texts, 5);

        let items = report["texts"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["label"], "positive");
        assert_eq!(items[1]["label"], "negative");
        assert_eq!(report["summary"]["breakdown"]["positive"], 1);
        assert_eq!(report["summary"]["breakdown"]["negative"], 1);
        assert!(report["summary"]["keywords"].as_array().unwrap().is_empty());
    }

    #[test]
    fn repeated_words_become_keywords() {
        let texts = vec![
            "Excellent battery life".to_string(),
            "Excellent battery, excellent screen".to_string(),
        ];
        let report = analyze(&texts, 5);

        assert_eq!(report["summary"]["overall"], "positive");
        let keywords = report["summary"]["keywords"].as_array().unwrap();
        assert_eq!(keywords[0]["word"], "excellent");
        assert_eq!(keywords[0]["count"], 3);
        assert_eq!(keywords[1]["word"], "battery");
    }

    #[test]
    fn summary_matches_review_aggregation() {
        let texts = vec![
            "Great app, love it!".to_string(),
            "Terrible experience".to_string(),
            "It's okay I guess".to_string(),
        ];
        let report = analyze(&texts, 1);

        let expected = SentimentAnalyzer::new()
            .analyze_texts(&texts)
            .with_keyword_limit(1);
        assert_eq!(report["summary"], serde_json::to_value(&expected).unwrap());
    }

    #[test]
    fn top_limits_keywords() {
        let texts = vec![
            "Excellent battery life".to_string(),
            "Excellent battery, excellent screen".to_string(),
        ];
        let report = analyze(&texts, 1);
        let keywords = report["summary"]["keywords"].as_array().unwrap();
        assert_eq!(keywords.len(), 1);
        assert_eq!(keywords[0]["word"], "excellent");
    }
}
