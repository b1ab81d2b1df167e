//! # Validation Tier Tests (T0-T3)
//!
//! If ANY tier fails, the engine is INVALID.
//!
//! ## Tiers
//! - T0: Identifier Integrity
//! - T1: Anchor Computation
//! - T2: Clone and History
//! - T3: Discourse Resolution

use wysiwym_core::{
    Anchor, ClassProperty, ClassSpec, ContentGraph, ContentValue, DateKind, DateParts, DateValue,
    Graph, Id, Node, PropertySpec, Schema, Session, SessionKind, WysiwymError,
};

fn project_schema() -> Schema {
    Schema::new()
        .with_class(
            "Project",
            ClassSpec::new()
                .property(ClassProperty::new("hasName").min(1).max(1))
                .property(ClassProperty::new("hasMember")),
        )
        .with_class(
            "Committee",
            ClassSpec::new()
                .property(ClassProperty::new("hasChair").min(2).max(2))
                .property(ClassProperty::new("hasReviewer").min(2).max(3)),
        )
        .with_property("hasMember", PropertySpec::new().inverse("memberOf"))
}

// =============================================================================
// TIER T0: IDENTIFIER INTEGRITY
// =============================================================================

mod t0_identifier_integrity {
    use super::*;
    use std::collections::BTreeSet;
    use wysiwym_core::primitives::ID_SPACE;

    /// T0.1: The whole identifier space is issued without duplicates.
    #[test]
    fn allocation_never_repeats_then_exhausts() {
        let mut graph: Graph<(), ()> = Graph::new();
        let mut seen = BTreeSet::new();
        for _ in 0..(ID_SPACE - 1) {
            let id = graph.allocate_id().expect("allocate");
            assert!(seen.insert(id), "duplicate {id}");
        }
        assert_eq!(graph.allocate_id(), Err(WysiwymError::IdSpaceExhausted));
        assert_eq!(graph.allocate_id(), Err(WysiwymError::IdSpaceExhausted));
    }

    /// T0.2: Exhaustion surfaces through node insertion too.
    #[test]
    fn exhausted_graph_rejects_new_nodes() {
        let mut graph: Graph<(), ()> = Graph::new();
        for _ in 0..(ID_SPACE - 1) {
            graph.add_node(Node::new("n", ())).expect("add");
        }
        assert_eq!(
            graph.add_node(Node::new("n", ())),
            Err(WysiwymError::IdSpaceExhausted)
        );
        // The never-allocated first code is still usable explicitly.
        let first: Id = "aaa".parse().expect("id");
        graph.add_node(Node::with_id(first, "n", ())).expect("explicit");
    }

    /// T0.3: Graphs never share allocators.
    #[test]
    fn graphs_allocate_independently() {
        let mut a = ContentGraph::new();
        let mut b = ContentGraph::new();
        let x = a.create_node("Project", ContentValue::Resource).expect("a");
        let y = b.create_node("Project", ContentValue::Resource).expect("b");
        assert_eq!(x, y);
    }
}

// =============================================================================
// TIER T1: ANCHOR COMPUTATION
// =============================================================================

mod t1_anchor_computation {
    use super::*;

    /// T1.1: The Project scenario.
    #[test]
    fn project_scenario() {
        let ontology = project_schema();
        let mut graph = ContentGraph::new();
        let project = graph.create_root("Project", ContentValue::Resource).expect("root");

        let anchor = Anchor::build(&graph, project, &ontology).expect("anchor");
        assert_eq!(anchor.compulsory_names(), vec!["hasName"]);
        assert_eq!(anchor.optional_names(), vec!["hasMember"]);
        assert!(anchor.removable_names().is_empty());
        assert!(anchor.is_red());

        graph
            .add_value(project, "hasName", "String", ContentValue::string("Apollo"), &ontology)
            .expect("bind");
        let anchor = Anchor::build(&graph, project, &ontology).expect("anchor");
        assert!(anchor.compulsory_names().is_empty());
        assert!(!anchor.is_red());
    }

    /// T1.2: A minimum of two moves out of compulsory after two bindings.
    #[test]
    fn minimum_two_then_satisfied() {
        let ontology = project_schema();
        let mut graph = ContentGraph::new();
        let committee = graph.create_node("Committee", ContentValue::Resource).expect("node");

        let anchor = Anchor::build(&graph, committee, &ontology).expect("anchor");
        assert_eq!(anchor.compulsory_names(), vec!["hasChair", "hasReviewer"]);

        for relation in ["hasChair", "hasReviewer"] {
            for _ in 0..2 {
                let person = graph.create_node("Person", ContentValue::Resource).expect("person");
                graph.bind(committee, relation, person, &ontology).expect("bind");
            }
        }

        let anchor = Anchor::build(&graph, committee, &ontology).expect("anchor");
        assert!(anchor.compulsory().is_empty());
        // max == 2: gone entirely; max == 3: still optional.
        assert_eq!(anchor.optional_names(), vec!["hasReviewer"]);
        assert!(!anchor.offers("hasChair"));
    }

    /// T1.3: Red if and only if something is compulsory.
    #[test]
    fn red_iff_compulsory() {
        let ontology = project_schema();
        let mut graph = ContentGraph::new();
        let project = graph.create_node("Project", ContentValue::Resource).expect("p");
        let committee = graph.create_node("Committee", ContentValue::Resource).expect("c");
        graph
            .add_value(project, "hasName", "String", ContentValue::string("Apollo"), &ontology)
            .expect("bind");

        graph.refresh_anchors(&ontology).expect("refresh");
        for id in [project, committee] {
            let anchor = graph.anchor(id).expect("anchor");
            assert_eq!(anchor.is_red(), !anchor.compulsory().is_empty());
        }
    }

    /// T1.4: Anchor construction failure propagates.
    #[test]
    fn not_an_anchor_propagates() {
        let ontology = project_schema();
        let mut graph = ContentGraph::new();
        let leaf = graph.create_node("String", ContentValue::string("x")).expect("leaf");
        assert_eq!(
            graph.refresh_anchor(leaf, &ontology).map(|a| a.is_red()),
            Err(WysiwymError::NotAnAnchor(leaf))
        );
    }

    /// T1.5: Date classification drives the preposition.
    #[test]
    fn date_classification() {
        let period = DateValue::year(2004);
        assert_eq!(period.kind().map(|k| k.as_str()), Some("period"));
        assert_eq!(period.kind().map(|k| k.preposition()), Some("in"));

        let point = DateValue::point(3, 5, 2004).expect("date");
        assert_eq!(point.kind().map(|k| k.as_str()), Some("point"));
        assert_eq!(point.kind().map(|k| k.preposition()), Some("on"));

        let range = DateValue::range(
            DateParts::default(),
            DateParts {
                year: Some(2004),
                ..DateParts::default()
            },
        )
        .expect("date");
        assert_eq!(range.kind(), Some(DateKind::Range));
        assert_eq!(range.kind().map(|k| k.preposition()), Some("between"));
    }
}

// =============================================================================
// TIER T2: CLONE AND HISTORY
// =============================================================================

mod t2_clone_and_history {
    use super::*;
    use wysiwym_core::{EdgeKind, snapshot_with_map};

    /// T2.1: Undo after a failed edit returns to the last good state.
    #[test]
    fn undo_skips_failed_edits() {
        let ontology = project_schema();
        let mut session = Session::new(SessionKind::Edit, 16);
        let project = session
            .create_root("Project", ContentValue::Resource)
            .expect("root");
        session
            .add_value(project, "hasName", "String", ContentValue::string("Apollo"), &ontology)
            .expect("name");
        let _ = session.add_value(
            project,
            "hasName",
            "String",
            ContentValue::string("Gemini"),
            &ontology,
        );

        session.undo().expect("undo");
        assert_eq!(session.graph().node_count(), 1);
        session.undo().expect("undo");
        assert_eq!(session.graph().node_count(), 0);
        assert_eq!(session.undo(), Err(WysiwymError::NothingToUndo));
    }

    /// T2.2: Branches from the same template do not see each other.
    #[test]
    fn sibling_branches_are_isolated() {
        let mut session = Session::default();
        let project = session
            .create_root("Project", ContentValue::Resource)
            .expect("root");
        let mut query = session.branch(SessionKind::Query, project).expect("query");
        let browse = session.branch(SessionKind::Browse, project).expect("browse");

        let root = query.graph().root().expect("root");
        query
            .create_node("Person", ContentValue::Resource)
            .expect("person");
        assert_eq!(query.graph().node_count(), 2);
        assert_eq!(browse.graph().node_count(), 1);
        assert_ne!(Some(root), session.graph().root());
    }

    /// T2.3: A long cycle is copied in full.
    #[test]
    fn long_cycle() {
        let mut graph = ContentGraph::new();
        let first = graph.create_root("Person", ContentValue::Resource).expect("root");
        let mut previous = first;
        for _ in 0..200 {
            let next = graph.create_node("Person", ContentValue::Resource).expect("node");
            graph.attach(previous, "knows", next, EdgeKind::Plain).expect("edge");
            previous = next;
        }
        graph.attach(previous, "knows", first, EdgeKind::Plain).expect("close");

        let (copy, map) = snapshot_with_map(&graph).expect("snapshot");
        assert_eq!(copy.node_count(), 201);
        assert_eq!(copy.edge_count(), 201);
        assert_eq!(map.len(), 201);
    }
}

// =============================================================================
// TIER T3: DISCOURSE RESOLUTION
// =============================================================================

mod t3_discourse {
    use wysiwym_core::primitives::CONJUNCT_RELATION;
    use wysiwym_core::{Category, Referent, ReferringExpressionResolver, SyntaxGraph, SyntaxNode};

    fn realize(resolver: &mut ReferringExpressionResolver, tree: &mut SyntaxGraph) -> Vec<String> {
        resolver
            .realize_sentence(tree)
            .expect("sentence")
            .into_iter()
            .map(|(_, d)| d.to_string())
            .collect()
    }

    /// T3.1: A short paragraph about papers.
    #[test]
    fn paragraph() {
        let mut resolver = ReferringExpressionResolver::new();

        // "A Paper and another Paper cite it."
        let mut first = SyntaxGraph::new();
        let s = first.set_root(SyntaxNode::plain(Category::Sentence)).expect("root");
        let coord = first
            .add_child(s, "subject", SyntaxNode::plain(Category::Coordination))
            .expect("coord");
        for id in ["p1", "p2"] {
            first
                .add_child(coord, CONJUNCT_RELATION, SyntaxNode::undetermined(Referent::new("Paper", id)))
                .expect("conjunct");
        }
        first
            .add_child(
                s,
                "object",
                SyntaxNode::undetermined(Referent::new("Project", "topic").topic()),
            )
            .expect("topic");
        assert_eq!(
            realize(&mut resolver, &mut first),
            vec!["a Paper", "another Paper", "it"]
        );

        // "The second Paper cites yet another Paper."
        let mut second = SyntaxGraph::new();
        let s = second.set_root(SyntaxNode::plain(Category::Sentence)).expect("root");
        second
            .add_child(s, "subject", SyntaxNode::undetermined(Referent::new("Paper", "p2")))
            .expect("subject");
        second
            .add_child(s, "object", SyntaxNode::undetermined(Referent::new("Paper", "p3")))
            .expect("object");
        assert_eq!(
            realize(&mut resolver, &mut second),
            vec!["the second Paper", "yet another Paper"]
        );
    }
}
