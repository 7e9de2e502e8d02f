//! # Nagare - Flowchart Process Engine
//!
//! **Nagare** turns flowcharts written in a small Mermaid-style text language
//! into executable graphs and runs them as processes. Each node is dispatched
//! to an executor chosen by its shape, and edges may carry boolean conditions
//! that decide which branch a process takes.
//!
//! ## Core Workflow
//!
//! 1.  **Parse**: [`syntax::FlowParser`] lexes and parses flowchart source into an
//!     AST and flattens it into a [`graph::FlowGraph`] of nodes and edges.
//!     Nodes only referenced by edges become plain rectangles.
//! 2.  **Build an engine**: [`engine::ProcessEngine::builder`] wires together the
//!     executor registry, the expression engine used for edge conditions and an
//!     event publisher.
//! 3.  **Execute**: [`engine::ProcessEngine::execute`] walks the graph for one
//!     [`process::ProcessInstance`] until it completes, suspends on a failed node,
//!     or terminates on a fatal error.
//! 4.  **Manage** (optional): [`service::DefinitionService`] and
//!     [`service::InstanceService`] keep versioned definitions and instances in
//!     memory and drive their lifecycle.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nagare::prelude::*;
//! use std::sync::Arc;
//!
//! fn main() -> Result<()> {
//!     let source = r#"
//! flowchart TD
//!     A((Start)) --> B[Receive order]
//!     B --> C{Amount check}
//!     C -->|?#amount > 1000| D[Manager approval]
//!     C -->|?#amount <= 1000| E[Auto approve]
//!     D --> F((End))
//!     E --> F
//! "#;
//!
//!     // Record every lifecycle event.
//!     let publisher = Arc::new(EventPublisher::new());
//!     let log = Arc::new(EventLog::new());
//!     publisher.subscribe_all(log.clone());
//!
//!     let engine = ProcessEngine::builder().with_publisher(publisher).build();
//!
//!     let mut instance = ProcessInstance::new("order-approval");
//!     instance.context.set("amount", 1500);
//!     engine.execute(&mut instance, source)?;
//!
//!     println!("Status: {}", instance.status);
//!     println!("Visited: {:?}", log.started_nodes());
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! The crate logs through `tracing` and never installs a subscriber. Lifecycle
//! transitions are logged at `info`, per-node dispatch and condition traces at
//! `debug`, and recovered faults at `warn`.

pub mod ast;
pub mod engine;
pub mod error;
pub mod event;
pub mod executor;
pub mod expression;
pub mod graph;
pub mod prelude;
pub mod process;
pub mod service;
pub mod syntax;
pub mod transform;
