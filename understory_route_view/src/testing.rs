// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A minimal host for unit tests.

use alloc::rc::Rc;

use crate::node::ViewHost;
use crate::props::Props;
use crate::record::MatchedRecord;

/// Components are names, instances are numbers, nodes are tagged prop bags.
#[derive(Debug)]
pub(crate) struct TestHost;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TestNode {
    pub(crate) tag: &'static str,
    pub(crate) props: Props,
}

impl ViewHost for TestHost {
    type Component = &'static str;
    type Instance = u32;
    type Node = TestNode;

    fn clone_with_props(&self, node: &TestNode, props: &Props) -> TestNode {
        let mut clone = node.clone();
        clone.props.merge(props);
        clone
    }
}

/// A shared record rendering `component` under the default name.
pub(crate) fn record(path: &'static str, component: &'static str) -> Rc<MatchedRecord<TestHost>> {
    MatchedRecord::new(path)
        .with_component("default", component)
        .into_shared()
}
