//! Property tests: generated flowcharts always become well-formed graphs.

use nagare::prelude::*;
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Decl {
    label: String,
    shape: NodeShape,
}

#[derive(Debug, Clone)]
struct Link {
    from: usize,
    to: usize,
    condition: Option<(String, u32)>,
}

fn arb_shape() -> impl Strategy<Value = NodeShape> {
    prop_oneof![
        Just(NodeShape::Rectangle),
        Just(NodeShape::Diamond),
        Just(NodeShape::Circle),
        Just(NodeShape::RoundRectangle),
    ]
}

fn arb_decl() -> impl Strategy<Value = Decl> {
    ("L[a-z0-9]{0,5}", arb_shape()).prop_map(|(label, shape)| Decl { label, shape })
}

/// Declarations plus links between them. Link endpoints may point one past
/// the declared nodes, which exercises implicit node creation.
fn arb_flowchart() -> impl Strategy<Value = (Vec<Decl>, Vec<Link>)> {
    prop::collection::vec(arb_decl(), 1..8).prop_flat_map(|decls| {
        let bound = decls.len() + 1;
        let link = (
            0..bound,
            0..bound,
            prop::option::of(("v[a-z0-9]{0,4}", 0u32..5000)),
        )
            .prop_map(|(from, to, condition)| Link {
                from,
                to,
                condition,
            });
        (Just(decls), prop::collection::vec(link, 0..12))
    })
}

fn render(decls: &[Decl], links: &[Link]) -> String {
    let mut source = String::from("flowchart TD\n");
    for (i, decl) in decls.iter().enumerate() {
        let body = match decl.shape {
            NodeShape::Diamond => format!("{{{}}}", decl.label),
            NodeShape::Circle => format!("(({}))", decl.label),
            NodeShape::RoundRectangle => format!("([{}])", decl.label),
            _ => format!("[{}]", decl.label),
        };
        source.push_str(&format!("    N{}{}\n", i, body));
    }
    for link in links {
        match &link.condition {
            Some((var, limit)) => source.push_str(&format!(
                "    N{} -->|?#{} > {}| N{}\n",
                link.from, var, limit, link.to
            )),
            None => source.push_str(&format!("    N{} --> N{}\n", link.from, link.to)),
        }
    }
    source
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// Every edge endpoint names exactly one node in the graph.
    #[test]
    fn edges_never_dangle((decls, links) in arb_flowchart()) {
        let graph = FlowParser::new().parse(&render(&decls, &links)).unwrap();

        prop_assert!(graph.dangling_endpoints().is_empty());
        for edge in &graph.edges {
            prop_assert_eq!(graph.nodes.iter().filter(|n| n.id == edge.from).count(), 1);
            prop_assert_eq!(graph.nodes.iter().filter(|n| n.id == edge.to).count(), 1);
        }
    }

    /// Declared nodes come first, in order, with their shapes and labels.
    #[test]
    fn declarations_are_preserved((decls, links) in arb_flowchart()) {
        let graph = FlowParser::new().parse(&render(&decls, &links)).unwrap();

        let implicit = links.iter().any(|l| l.from == decls.len() || l.to == decls.len());
        prop_assert_eq!(graph.nodes.len(), decls.len() + usize::from(implicit));
        prop_assert_eq!(graph.edges.len(), links.len());

        for (i, decl) in decls.iter().enumerate() {
            let node = &graph.nodes[i];
            prop_assert_eq!(&node.id, &format!("N{}", i));
            prop_assert_eq!(&node.label, &decl.label);
            prop_assert_eq!(node.shape, decl.shape);
        }
        if implicit {
            let extra = &graph.nodes[decls.len()];
            prop_assert_eq!(extra.shape, NodeShape::Rectangle);
            prop_assert_eq!(&extra.label, &extra.id);
        }
    }

    /// Conditions lose their whitespace and `?` marker but nothing else.
    #[test]
    fn conditions_are_kept_in_order((decls, links) in arb_flowchart()) {
        let graph = FlowParser::new().parse(&render(&decls, &links)).unwrap();

        for (edge, link) in graph.edges.iter().zip(&links) {
            let expected = link
                .condition
                .as_ref()
                .map(|(var, limit)| format!("#{}>{}", var, limit))
                .unwrap_or_default();
            prop_assert_eq!(&edge.condition, &expected);
            prop_assert!(edge.label.is_empty());
        }
    }

    /// The JSON form reads back into the same graph.
    #[test]
    fn json_form_is_stable((decls, links) in arb_flowchart()) {
        let parser = FlowParser::new();
        let source = render(&decls, &links);
        let graph = parser.parse(&source).unwrap();

        prop_assert_eq!(&FlowGraph::from_json(&graph.to_json().unwrap()).unwrap(), &graph);
        prop_assert_eq!(parser.parse(&source).unwrap(), graph);
    }
}
