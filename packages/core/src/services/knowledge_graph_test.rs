//! Tests for KnowledgeGraphService
//!
//! Tests cover:
//! - Lazy and eager initialization, exactly-once builds
//! - Lookup, lineage, pillar shortcut and topic payload queries
//! - Cross-pillar navigation
//! - Search matching, limits and ordering
//! - Degraded behaviour on source failure and corrupted parent chains

#[cfg(test)]
mod tests {
    use crate::config::GraphConfig;
    use crate::content::{parse_forest, ContentError};
    use crate::models::{Forest, KnowledgeNode, NodeKind, NodePayload, Pillar};
    use crate::services::knowledge_graph::{IndexState, KnowledgeGraphService};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn forest(value: Value) -> Forest {
        parse_forest(&value).unwrap()
    }

    /// Two pillars, 13 nodes, five topics overall
    fn curriculum() -> Value {
        json!([
            {
                "id": "sys", "title": "Systems", "code": "SYS", "color": "#336699",
                "sections": [
                    { "id": "sys-mem", "title": "Memory", "subSections": [
                        { "id": "sys-mem-vm", "title": "Virtual Memory", "topics": [
                            { "id": "paging", "title": "Paging",
                              "contentPoints": ["page tables", "TLB"],
                              "relatedTopics": ["tlb", "gone", "sys-mem"] },
                            { "id": "tlb", "title": "Translation Lookaside Buffer" }
                        ]}
                    ]},
                    { "id": "sys-sched", "title": "Scheduling", "subSections": [
                        { "id": "sys-sched-basics", "title": "Basics", "topics": [
                            { "id": "round-robin", "title": "Round Robin" }
                        ]}
                    ]}
                ]
            },
            {
                "id": "net", "title": "Networking", "code": "NET",
                "sections": [
                    { "id": "net-tcp", "title": "Transport", "subSections": [
                        { "id": "net-tcp-core", "title": "TCP", "topics": [
                            { "id": "handshake", "title": "Three-Way Handshake" },
                            { "id": "congestion", "title": "Congestion Control" }
                        ]}
                    ]}
                ]
            }
        ])
    }

    fn graph() -> KnowledgeGraphService {
        KnowledgeGraphService::from_forest(forest(curriculum()), GraphConfig::default())
    }

    fn ids<'a>(nodes: &[&'a KnowledgeNode]) -> Vec<&'a str> {
        nodes.iter().map(|n| n.id.as_str()).collect()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    #[test]
    fn test_lazy_service_builds_on_first_query() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = loads.clone();
        let source = move || -> Result<Forest, ContentError> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(parse_forest(&curriculum()).unwrap())
        };

        let service = KnowledgeGraphService::new(source, GraphConfig::default());
        assert_eq!(service.state(), IndexState::Uninitialized);
        assert_eq!(loads.load(Ordering::SeqCst), 0);

        assert!(service.get_node("paging").is_some());
        assert_eq!(service.state(), IndexState::Ready);

        service.get_lineage("tlb");
        service.search("tcp", 5);
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_eager_service_is_ready_after_construction() {
        let service = graph();
        assert_eq!(service.state(), IndexState::Ready);
        assert_eq!(service.index().len(), 13);
    }

    #[test]
    fn test_ensure_ready_is_idempotent() {
        let service = graph();
        let before = service.index().clone();

        assert_eq!(service.ensure_ready(), IndexState::Ready);
        assert_eq!(service.ensure_ready(), IndexState::Ready);
        assert_eq!(service.index(), &before);
    }

    #[test]
    fn test_concurrent_first_queries_build_once() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = loads.clone();
        let source = move || -> Result<Forest, ContentError> {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(20));
            Ok(parse_forest(&curriculum()).unwrap())
        };
        let service = Arc::new(KnowledgeGraphService::new(source, GraphConfig::default()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = service.clone();
                std::thread::spawn(move || service.get_lineage("congestion").len())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 4);
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(service.state(), IndexState::Ready);
    }

    #[test]
    fn test_failed_source_serves_empty_graph() {
        let source = || -> Result<Forest, ContentError> {
            Err(ContentError::invalid_shape("expected an array of pillars"))
        };
        let service = KnowledgeGraphService::new(source, GraphConfig::default());

        assert_eq!(service.ensure_ready(), IndexState::BuildFailed);
        assert!(service.index().is_empty());
        assert!(service.get_node("paging").is_none());
        assert!(service.get_lineage("paging").is_empty());
        assert!(service.search("a", 10).is_empty());
        assert_eq!(service.get_topic_navigation("paging"), Default::default());
    }

    #[test]
    fn test_from_config_without_path_fails_open() {
        let service = KnowledgeGraphService::from_config(GraphConfig::default());
        assert_eq!(service.state(), IndexState::Uninitialized);
        assert_eq!(service.ensure_ready(), IndexState::BuildFailed);
    }

    #[test]
    fn test_empty_forest_is_ready_not_failed() {
        let service = KnowledgeGraphService::from_forest(Vec::new(), GraphConfig::default());
        assert_eq!(service.state(), IndexState::Ready);
        assert_eq!(service.index().len(), 0);
        assert_eq!(service.index().topic_count(), 0);
        assert!(service.get_node("anything").is_none());
    }

    #[test]
    fn test_invalid_config_falls_back_to_defaults() {
        let config = GraphConfig {
            default_search_limit: 0,
            ..GraphConfig::default()
        };
        let service = KnowledgeGraphService::from_forest(Vec::new(), config);
        assert_eq!(service.config(), &GraphConfig::default());
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    #[test]
    fn test_every_node_is_found_by_id() {
        let service = graph();
        for node in service.index().nodes() {
            assert_eq!(service.get_node(&node.id).map(|n| n.id.as_str()), Some(node.id.as_str()));
        }
    }

    #[test]
    fn test_unknown_id_is_absent() {
        let service = graph();
        assert!(service.get_node("nonexistent-id").is_none());
        assert!(service.get_title("nonexistent-id").is_none());
        assert!(service.get_topic("nonexistent-id").is_none());
        assert!(service.get_children("nonexistent-id").is_empty());
    }

    #[test]
    fn test_get_title() {
        let service = graph();
        assert_eq!(service.get_title("net"), Some("Networking"));
        assert_eq!(service.get_title("tlb"), Some("Translation Lookaside Buffer"));
    }

    #[test]
    fn test_get_topic_only_for_topics() {
        let service = graph();

        let topic = service.get_topic("paging").unwrap();
        assert_eq!(topic.content_points, vec!["page tables", "TLB"]);

        assert!(service.get_topic("sys-mem").is_none());
        assert!(service.get_topic("sys-mem-vm").is_none());
        assert!(service.get_topic("sys").is_none());
    }

    #[test]
    fn test_pillar_payload_is_pattern_matchable() {
        let service = graph();
        let node = service.get_node("sys").unwrap();
        match &node.data {
            NodePayload::Pillar(pillar) => {
                assert_eq!(pillar.code, "SYS");
                assert_eq!(pillar.color.as_deref(), Some("#336699"));
                assert_eq!(pillar.sections.len(), 2);
            }
            other => panic!("expected pillar payload, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_pillar_for_topic() {
        let service = graph();

        assert_eq!(service.get_pillar_id_for_topic("handshake"), Some("net"));
        let pillar: &Arc<Pillar> = service.get_pillar_for_topic("round-robin").unwrap();
        assert_eq!(pillar.id, "sys");

        // Sections are not topics
        assert!(service.get_pillar_id_for_topic("net-tcp").is_none());
        assert!(service.get_pillar_for_topic("net-tcp").is_none());
        assert!(service.get_pillar_for_topic("gone").is_none());
    }

    #[test]
    fn test_get_children() {
        let service = graph();
        assert_eq!(ids(&service.get_children("sys")), vec!["sys-mem", "sys-sched"]);
        assert_eq!(ids(&service.get_children("net-tcp-core")), vec!["handshake", "congestion"]);
        assert!(service.get_children("tlb").is_empty());
    }

    #[test]
    fn test_related_topics_skip_stale_and_non_topic_links() {
        let service = graph();
        assert_eq!(ids(&service.get_related_topics("paging")), vec!["tlb"]);
        assert!(service.get_related_topics("tlb").is_empty());
        assert!(service.get_related_topics("sys").is_empty());
    }

    #[test]
    fn test_topics_in_pillar() {
        let service = graph();
        assert_eq!(
            ids(&service.topics_in_pillar("sys")),
            vec!["paging", "tlb", "round-robin"]
        );
        assert_eq!(ids(&service.topics_in_pillar("net")), vec!["handshake", "congestion"]);
        assert!(service.topics_in_pillar("paging").is_empty());
    }

    // =========================================================================
    // Lineage
    // =========================================================================

    #[test]
    fn test_lineage_root_first() {
        let service = graph();
        assert_eq!(
            ids(&service.get_lineage("round-robin")),
            vec!["sys", "sys-sched", "sys-sched-basics", "round-robin"]
        );
        assert_eq!(ids(&service.get_lineage("net-tcp")), vec!["net", "net-tcp"]);
        assert_eq!(ids(&service.get_lineage("net")), vec!["net"]);
    }

    #[test]
    fn test_lineage_starts_at_pillar_and_ends_at_node() {
        let service = graph();
        for node in service.index().nodes() {
            let lineage = service.get_lineage(&node.id);
            assert_eq!(lineage.first().unwrap().kind, NodeKind::Pillar);
            assert_eq!(lineage.last().unwrap().id, node.id);
        }
    }

    #[test]
    fn test_lineage_root_matches_pillar_shortcut() {
        let service = graph();
        for topic in service.index().flat_topics() {
            let lineage = service.get_lineage(&topic.id);
            assert_eq!(service.get_pillar_id_for_topic(&topic.id), Some(lineage[0].id.as_str()));
        }
    }

    #[test]
    fn test_lineage_unknown_id_is_empty() {
        assert!(graph().get_lineage("nonexistent-id").is_empty());
    }

    #[test]
    fn test_lineage_terminates_on_cycle() {
        // Pillar "loop" reuses the id of a topic nested under it, so the
        // topic's parent chain leads back to itself.
        let service = KnowledgeGraphService::from_forest(
            forest(json!([
                { "id": "loop", "title": "Pillar", "sections": [
                    { "id": "s", "title": "S", "subSections": [
                        { "id": "ss", "title": "SS", "topics": [{ "id": "loop", "title": "Topic" }] }
                    ]}
                ]}
            ])),
            GraphConfig::default(),
        );

        let lineage = service.get_lineage("loop");
        assert!(!lineage.is_empty());
        assert!(lineage.len() <= service.config().max_lineage_depth);
        assert_eq!(lineage.last().unwrap().id, "loop");
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    #[test]
    fn test_navigation_adjacent_pairs() {
        let service = graph();
        let topics: Vec<&KnowledgeNode> = service.index().flat_topics().collect();

        for pair in topics.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            assert_eq!(service.get_topic_navigation(&a.id).next.map(|n| &n.id), Some(&b.id));
            assert_eq!(service.get_topic_navigation(&b.id).prev.map(|n| &n.id), Some(&a.id));
        }
    }

    #[test]
    fn test_navigation_ends() {
        let service = graph();

        let first = service.get_topic_navigation("paging");
        assert!(first.prev.is_none());
        assert_eq!(first.next.map(|n| n.id.as_str()), Some("tlb"));

        let last = service.get_topic_navigation("congestion");
        assert_eq!(last.prev.map(|n| n.id.as_str()), Some("handshake"));
        assert!(last.next.is_none());
    }

    #[test]
    fn test_navigation_crosses_pillar_boundary() {
        let service = graph();
        let nav = service.get_topic_navigation("round-robin");
        assert_eq!(nav.prev.map(|n| n.id.as_str()), Some("tlb"));
        assert_eq!(nav.next.map(|n| n.id.as_str()), Some("handshake"));
    }

    #[test]
    fn test_navigation_for_non_topic_is_empty() {
        let service = graph();
        let nav = service.get_topic_navigation("sys-mem");
        assert!(nav.prev.is_none() && nav.next.is_none());
        let nav = service.get_topic_navigation("nonexistent-id");
        assert!(nav.prev.is_none() && nav.next.is_none());
    }

    // =========================================================================
    // Search
    // =========================================================================

    #[test]
    fn test_search_blank_query_is_empty() {
        let service = graph();
        for limit in [0, 1, 10, usize::MAX] {
            assert!(service.search("", limit).is_empty());
            assert!(service.search("   \t", limit).is_empty());
        }
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let service = graph();
        assert_eq!(ids(&service.search("MEMORY", 10)), vec!["sys-mem", "sys-mem-vm"]);
        assert_eq!(ids(&service.search("hand", 10)), vec!["handshake"]);
    }

    #[test]
    fn test_search_matches_pillar_title_or_code() {
        let service = graph();
        assert_eq!(ids(&service.search("net", 10)), vec!["net"]);
        assert_eq!(ids(&service.search("SYS", 10)), vec!["sys"]);
    }

    #[test]
    fn test_search_code_match_is_pillar_only() {
        // Only the pillar's title doesn't contain the code; the section's
        // `code` is an unmodelled extra field and is not searched
        let service = KnowledgeGraphService::from_forest(
            forest(json!([{ "id": "p", "title": "Pillar", "code": "QQ",
                "sections": [{ "id": "s", "title": "Section", "code": "QQ" }] }])),
            GraphConfig::default(),
        );
        assert_eq!(ids(&service.search("qq", 10)), vec!["p"]);
    }

    #[test]
    fn test_search_respects_limit_in_tree_order() {
        let service = graph();
        let all = service.search("o", 100);
        assert!(all.len() > 3);

        let limited = service.search("o", 3);
        assert_eq!(limited.len(), 3);
        assert_eq!(ids(&limited), ids(&all[..3]));
        assert!(service.search("o", 0).is_empty());
    }

    #[test]
    fn test_search_results_contain_query() {
        let service = graph();
        for query in ["o", "TCP", "con", "sys", "memory"] {
            let needle = query.to_lowercase();
            for node in service.search(query, 50) {
                let code = node
                    .data
                    .as_pillar()
                    .map(|p| p.code.to_lowercase())
                    .unwrap_or_default();
                assert!(node.title.to_lowercase().contains(&needle) || code.contains(&needle));
            }
        }
    }

    #[test]
    fn test_search_is_stable() {
        let service = graph();
        assert_eq!(ids(&service.search("o", 10)), ids(&service.search("o", 10)));
    }

    #[test]
    fn test_search_default_uses_configured_limit() {
        let config = GraphConfig {
            default_search_limit: 2,
            ..GraphConfig::default()
        };
        let service = KnowledgeGraphService::from_forest(forest(curriculum()), config);
        assert_eq!(service.search_default("o").len(), 2);
    }
}
