//! Integration tests for multi-source resolution and batch validation.

mod common;

use common::mocks::{record, StaticSource};
use papyrus::citations::{BibliographicResolver, ReferenceValidator};
use papyrus::progress::{ProgressCollector, ProgressEvent};
use papyrus::types::{Reference, SourceRecord};
use std::sync::Arc;
use std::time::Duration;

const DOI: &str = "10.1000/xyz";

fn resolver(
    primary: StaticSource,
    citation_graph: StaticSource,
    registry: StaticSource,
) -> BibliographicResolver {
    BibliographicResolver::new(
        Arc::new(primary),
        Arc::new(citation_graph),
        Arc::new(registry),
        Duration::from_secs(1),
    )
}

fn candidate() -> Reference {
    Reference::candidate("attention is all you need", "Journal Scout").with_doi(DOI)
}

#[tokio::test]
async fn test_higher_trust_source_wins_every_field() {
    let registry = StaticSource::new("registry").with_record(
        DOI,
        SourceRecord {
            title: Some("Registry Title".to_string()),
            venue: Some("X".to_string()),
            year: Some("2016".to_string()),
            authors: vec!["R. Author".to_string()],
            ..Default::default()
        },
    );
    let graph = StaticSource::new("graph").with_record(
        DOI,
        SourceRecord {
            venue: Some("Graph Venue".to_string()),
            ..Default::default()
        },
    );
    let primary = StaticSource::new("primary").with_record(
        DOI,
        SourceRecord {
            title: Some("Attention Is All You Need".to_string()),
            venue: Some("Y".to_string()),
            year: Some("2017".to_string()),
            ..Default::default()
        },
    );

    let resolved = resolver(primary, graph, registry).resolve(candidate()).await;

    assert!(resolved.is_verified);
    assert_eq!(resolved.venue.as_deref(), Some("Y"));
    assert_eq!(resolved.title, "Attention Is All You Need");
    assert_eq!(resolved.year, "2017");
    // Primary had no authors, so the registry's survive
    assert_eq!(resolved.authors, vec!["R. Author".to_string()]);
}

#[tokio::test]
async fn test_citation_count_and_abstract_gates_across_sources() {
    let registry = StaticSource::new("registry").with_record(
        DOI,
        SourceRecord {
            citation_count: Some(10),
            abstract_text: Some("x".repeat(200)),
            ..Default::default()
        },
    );
    let primary = StaticSource::new("primary").with_record(
        DOI,
        SourceRecord {
            citation_count: Some(5),
            abstract_text: Some("y".repeat(20)),
            ..Default::default()
        },
    );

    let resolved = resolver(primary, StaticSource::new("graph"), registry)
        .resolve(candidate())
        .await;

    assert_eq!(resolved.citation_count, Some(10));
    assert_eq!(resolved.abstract_text, Some("x".repeat(200)));
}

#[tokio::test]
async fn test_unverifiable_candidate_is_field_identical() {
    let resolver = resolver(
        StaticSource::new("primary"),
        StaticSource::new("graph"),
        StaticSource::new("registry"),
    );
    let candidate = Reference::candidate("A Survey of Things That Do Not Exist", "Survey Scout")
        .with_authors(["Nobody"])
        .with_year("2031");

    let resolved = resolver.resolve(candidate.clone()).await;

    assert!(!resolved.is_verified);
    assert_eq!(resolved, candidate);
}

#[tokio::test]
async fn test_all_sources_failing_leaves_candidate_unverified() {
    let resolver = resolver(
        StaticSource::failing("primary"),
        StaticSource::failing("graph"),
        StaticSource::failing("registry"),
    );
    let candidate = candidate();

    let resolved = resolver.resolve(candidate.clone()).await;
    assert!(!resolved.is_verified);
    assert_eq!(resolved.title, candidate.title);
    assert!(resolved.bibtex.is_none());
}

#[tokio::test]
async fn test_single_source_match_is_enough() {
    let graph = StaticSource::new("graph").with_record(DOI, record(DOI, "From The Graph"));
    let resolved = resolver(
        StaticSource::failing("primary"),
        graph,
        StaticSource::failing("registry"),
    )
    .resolve(candidate())
    .await;

    assert!(resolved.is_verified);
    assert_eq!(resolved.title, "From The Graph");
    assert!(resolved.bibtex.unwrap().contains("title = {From The Graph}"));
}

#[tokio::test]
async fn test_title_search_resolves_missing_doi() {
    let title = "Deep Residual Learning for Image Recognition";
    let doi = "10.1109/cvpr.2016.90";
    let primary = StaticSource::new("primary")
        .with_title_hit(title, record(doi, title))
        .with_record(doi, record(doi, title));

    let resolved = resolver(primary, StaticSource::new("graph"), StaticSource::new("registry"))
        .resolve(Reference::candidate(title, "Conference Scout"))
        .await;

    assert!(resolved.is_verified);
    assert_eq!(resolved.doi.as_deref(), Some(doi));
}

#[tokio::test]
async fn test_garbage_doi_falls_back_to_title_search() {
    let primary = StaticSource::new("primary");
    let resolved = resolver(primary, StaticSource::new("graph"), StaticSource::new("registry"))
        .resolve(Reference::candidate("Anything", "a").with_doi("N/A"))
        .await;

    assert!(!resolved.is_verified);
    assert_eq!(resolved.doi.as_deref(), Some("N/A"));
}

#[tokio::test(start_paused = true)]
async fn test_slow_source_times_out_without_blocking_others() {
    let primary = StaticSource::new("primary")
        .with_record(DOI, record(DOI, "Too Late"))
        .with_delay(DOI, Duration::from_secs(30));
    let registry = StaticSource::new("registry").with_record(DOI, record(DOI, "On Time"));

    let resolved = resolver(primary, StaticSource::new("graph"), registry)
        .resolve(candidate())
        .await;

    assert!(resolved.is_verified);
    assert_eq!(resolved.title, "On Time");
}

#[tokio::test(start_paused = true)]
async fn test_validator_preserves_input_order() {
    let primary = StaticSource::new("primary")
        .with_record("10.1000/a", record("10.1000/a", "Paper A"))
        .with_record("10.1000/b", record("10.1000/b", "Paper B"))
        .with_record("10.1000/c", record("10.1000/c", "Paper C"))
        .with_delay("10.1000/a", Duration::from_millis(300))
        .with_delay("10.1000/b", Duration::from_millis(100));
    let resolver = Arc::new(resolver(
        primary,
        StaticSource::new("graph"),
        StaticSource::new("registry"),
    ));
    let validator = ReferenceValidator::new(resolver);

    let candidates = vec![
        Reference::candidate("a", "x").with_doi("10.1000/a"),
        Reference::candidate("b", "x").with_doi("10.1000/b"),
        Reference::candidate("c", "x").with_doi("10.1000/c"),
    ];
    let progress = ProgressCollector::new();
    let validated = validator.validate_batch(candidates, &progress).await;

    let titles: Vec<_> = validated.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Paper A", "Paper B", "Paper C"]);

    let completions: Vec<(usize, String)> = progress
        .events()
        .into_iter()
        .filter_map(|event| match event {
            ProgressEvent::ReferenceValidated {
                completed, title, ..
            } => Some((completed, title)),
            _ => None,
        })
        .collect();
    assert_eq!(
        completions,
        vec![
            (1, "Paper C".to_string()),
            (2, "Paper B".to_string()),
            (3, "Paper A".to_string())
        ]
    );
}

#[tokio::test]
async fn test_validator_reports_failures_too() {
    let resolver = Arc::new(resolver(
        StaticSource::failing("primary"),
        StaticSource::failing("graph"),
        StaticSource::failing("registry"),
    ));
    let validator = ReferenceValidator::new(resolver).with_max_concurrency(Some(1));
    assert_eq!(validator.max_concurrency(), Some(1));

    let progress = ProgressCollector::new();
    let validated = validator
        .validate_batch(
            vec![
                Reference::candidate("a", "x").with_doi("10.1000/a"),
                Reference::candidate("b", "x"),
            ],
            &progress,
        )
        .await;

    assert_eq!(validated.len(), 2);
    assert!(validated.iter().all(|r| !r.is_verified));
    assert_eq!(progress.len(), 2);
}

#[tokio::test]
async fn test_validator_empty_batch() {
    let resolver = Arc::new(resolver(
        StaticSource::new("primary"),
        StaticSource::new("graph"),
        StaticSource::new("registry"),
    ));
    let progress = ProgressCollector::new();
    let validated = ReferenceValidator::new(resolver)
        .validate_batch(Vec::new(), &progress)
        .await;
    assert!(validated.is_empty());
    assert!(progress.is_empty());
}
