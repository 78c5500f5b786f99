//! # Integration Flows
//!
//! Block replication exercised across shared-types, shared-bus and qc-18.

mod replication_flows;
