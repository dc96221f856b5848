//! Integration tests for the debug command surface
//!
//! Drives the registry through textual commands the way an operator would and
//! checks filter list contents, scope bits and trace gating.

#[cfg(test)]
mod tests {
    use bgpd_debug::notify::{code, subcode, UNRECOGNIZED_CODE, UNRECOGNIZED_SUBCODE};
    use bgpd_debug::{
        decode, execute_line, show_debugging, write_config, Category, CommandNode, CommandOutput,
        CommandStatus, DebugFlags, DebugRegistry, Direction, IpPrefix, ListId, Neighbor,
        NeighborRef, NeighborTable,
    };
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    struct Fixture {
        neighbors: NeighborTable,
        registry: DebugRegistry,
        peer1: NeighborRef,
        peer2: NeighborRef,
        unnumbered: NeighborRef,
    }

    impl Fixture {
        fn new() -> Self {
            let mut neighbors = NeighborTable::new();
            let peer1 = neighbors.add(Neighbor::with_address("10.0.0.1".parse().unwrap()));
            let peer2 = neighbors.add(Neighbor::with_address("2001:db8::2".parse().unwrap()));
            let unnumbered = neighbors.add(Neighbor::with_interface("swp1"));
            Self {
                neighbors,
                registry: DebugRegistry::new(),
                peer1,
                peer2,
                unnumbered,
            }
        }

        fn enable(&mut self, line: &str) -> CommandOutput {
            execute_line(&mut self.registry, &self.neighbors, CommandNode::Enable, line)
        }

        fn config(&mut self, line: &str) -> CommandOutput {
            execute_line(&mut self.registry, &self.neighbors, CommandNode::Config, line)
        }
    }

    fn prefix(s: &str) -> IpPrefix {
        s.parse().expect("valid prefix")
    }

    #[test]
    fn test_duplicate_neighbor_filter_kept_once() {
        let mut fx = Fixture::new();
        fx.enable("debug bgp keepalives 10.0.0.1");
        let second = fx.enable("debug bgp keepalives 10.0.0.1");

        assert_eq!(second.status, CommandStatus::Success);
        assert_eq!(
            second.lines,
            vec!["BGP keepalive debugging is already enabled for 10.0.0.1"]
        );
        assert_eq!(fx.registry.list(ListId::Keepalive).unwrap().len(), 1);
        // fixture handle, table, one filter entry
        assert_eq!(Arc::strong_count(&fx.peer1), 3);
    }

    #[test]
    fn test_add_then_remove_restores_state() {
        let mut fx = Fixture::new();
        for (add, remove, category, flag, list) in [
            (
                "debug bgp neighbor-events swp1",
                "no debug bgp neighbor-events swp1",
                Category::NeighborEvents,
                DebugFlags::NEIGHBOR_EVENTS,
                ListId::NeighborEvents,
            ),
            (
                "debug bgp updates out 2001:db8::2",
                "no debug bgp updates out 2001:db8::2",
                Category::Update,
                DebugFlags::UPDATE_OUT,
                ListId::UpdateOut,
            ),
            (
                "debug bgp updates prefix 10.0.0.0/8",
                "no debug bgp updates prefix 10.0.0.0/8",
                Category::Update,
                DebugFlags::UPDATE_PREFIX,
                ListId::UpdatePrefix,
            ),
            (
                "debug bgp zebra prefix 2001:db8::/32",
                "no debug bgp zebra prefix 2001:db8::/32",
                Category::Zebra,
                DebugFlags::ZEBRA,
                ListId::Zebra,
            ),
        ] {
            assert!(fx.enable(add).is_success(), "{add}");
            assert!(fx.registry.session_enabled(category, flag), "{add}");
            assert_eq!(fx.registry.list(list).unwrap().len(), 1, "{add}");

            assert!(fx.enable(remove).is_success(), "{remove}");
            assert!(fx.registry.list(list).unwrap().is_empty(), "{remove}");
            assert!(!fx.registry.session_enabled(category, flag), "{remove}");
        }
        assert!(fx.registry.is_idle());
        assert_eq!(Arc::strong_count(&fx.unnumbered), 2);
        assert_eq!(Arc::strong_count(&fx.peer2), 2);
    }

    #[test]
    fn test_filter_over_unfiltered_category_turns_it_off_on_removal() {
        // an emptied list switches the flag off even if it was on before the add
        let mut fx = Fixture::new();
        fx.enable("debug bgp keepalives");
        assert!(fx.registry.should_trace_keepalive(Some(&*fx.peer2)));

        fx.enable("debug bgp keepalives 10.0.0.1");
        assert!(!fx.registry.should_trace_keepalive(Some(&*fx.peer2)));

        let out = fx.enable("no debug bgp keepalives 10.0.0.1");
        assert_eq!(out.lines, vec!["BGP keepalives debugging is off for 10.0.0.1"]);
        assert!(fx.registry.list(ListId::Keepalive).unwrap().is_empty());
        assert!(!fx.registry.session_enabled(Category::Keepalive, DebugFlags::KEEPALIVE));
        assert!(!fx.registry.should_trace_keepalive(Some(&*fx.peer2)));
        assert!(fx.registry.is_idle());
    }

    #[test]
    fn test_prefix_filter_exact_match_only() {
        let mut fx = Fixture::new();
        fx.enable("debug bgp updates prefix 10.0.0.0/8");
        let reg = &fx.registry;

        let traced = |p: &str| reg.should_trace_update(None, Some(&prefix(p)), Direction::Inbound);
        assert!(traced("10.0.0.0/8"));
        assert!(!traced("10.1.0.0/16"));
        assert!(!traced("10.0.0.0/9"));
        assert!(!traced("11.0.0.0/8"));
    }

    #[test]
    fn test_update_truth_table() {
        // direction clause: inbound updates for peer1 only
        // prefix clause: 192.0.2.0/24 only
        let mut fx = Fixture::new();
        fx.enable("debug bgp updates in 10.0.0.1");
        fx.enable("debug bgp updates prefix 192.0.2.0/24");
        let reg = &fx.registry;
        let matching = prefix("192.0.2.0/24");
        let other = prefix("198.51.100.0/24");

        let cases = [
            (&fx.peer1, &matching, true),
            (&fx.peer1, &other, true),
            (&fx.peer2, &matching, true),
            (&fx.peer2, &other, false),
        ];
        for (peer, p, expected) in cases {
            assert_eq!(
                reg.should_trace_update(Some(&**peer), Some(p), Direction::Inbound),
                expected,
                "{} {}",
                peer.host(),
                p
            );
        }
    }

    #[test]
    fn test_scopes_are_independent() {
        let mut reg = DebugRegistry::new();
        reg.enable_session(Category::Nht, DebugFlags::NHT);
        assert!(!reg.config_enabled(Category::Nht, DebugFlags::NHT));

        reg.enable_config(Category::Zebra, DebugFlags::ZEBRA);
        assert!(!reg.session_enabled(Category::Zebra, DebugFlags::ZEBRA));

        reg.enable_config(Category::Nht, DebugFlags::NHT);
        reg.disable_session(Category::Nht, DebugFlags::NHT);
        assert!(reg.config_enabled(Category::Nht, DebugFlags::NHT));
        assert!(!reg.session_enabled(Category::Nht, DebugFlags::NHT));
    }

    #[test]
    fn test_decode_fallbacks() {
        let labels = decode(code::UPDATE_ERR, 200);
        assert_eq!(labels.code, "UPDATE Message Error");
        assert_eq!(labels.subcode, UNRECOGNIZED_SUBCODE);

        let labels = decode(255, subcode::update::MAL_ATTR);
        assert_eq!(labels.code, UNRECOGNIZED_CODE);
        assert_eq!(labels.subcode, "");
    }

    #[test]
    fn test_bulk_no_debug_releases_everything() {
        let mut fx = Fixture::new();
        let baseline = [
            Arc::strong_count(&fx.peer1),
            Arc::strong_count(&fx.peer2),
            Arc::strong_count(&fx.unnumbered),
        ];

        for line in [
            "debug bgp neighbor-events 10.0.0.1",
            "debug bgp keepalives 10.0.0.1",
            "debug bgp keepalives swp1",
            "debug bgp updates in 2001:db8::2",
            "debug bgp updates prefix 10.0.0.0/8",
            "debug bgp zebra prefix 2001:db8::/32",
            "debug bgp as4",
            "debug bgp nht",
        ] {
            assert!(fx.config(line).is_success(), "{line}");
        }
        // neighbor-events and keepalives, each in the config and session lists
        assert_eq!(Arc::strong_count(&fx.peer1), baseline[0] + 4);

        let out = fx.enable("no debug bgp");
        assert_eq!(out.lines, vec!["All possible debugging has been turned off"]);
        assert!(fx.registry.is_idle());
        for id in ListId::ALL {
            assert!(fx.registry.list(id).is_none_or(|l| l.is_empty()), "{id:?}");
            assert!(fx.registry.config_list(id).is_none_or(|l| l.is_empty()), "{id:?}");
        }
        assert_eq!(
            [
                Arc::strong_count(&fx.peer1),
                Arc::strong_count(&fx.peer2),
                Arc::strong_count(&fx.unnumbered),
            ],
            baseline
        );
    }

    #[test]
    fn test_input_errors_leave_state_untouched() {
        let mut fx = Fixture::new();
        fx.enable("debug bgp updates prefix 10.0.0.0/8");
        let before = show_debugging(&fx.registry);

        let out = fx.enable("debug bgp neighbor-events 10.9.9.9");
        assert_eq!(out.status, CommandStatus::Warning);
        assert_eq!(out.lines, vec!["10.9.9.9 is not a configured peer"]);

        let out = fx.enable("no debug bgp updates prefix 10.0.0.0/33");
        assert_eq!(out.status, CommandStatus::Warning);
        assert_eq!(out.lines, vec!["% Malformed Prefix"]);

        assert_eq!(show_debugging(&fx.registry), before);
    }

    #[test]
    fn test_zebra_prefix_removal_leaves_other_lists() {
        let mut fx = Fixture::new();
        fx.enable("debug bgp neighbor-events 10.0.0.1");
        fx.enable("debug bgp zebra prefix 10.0.0.0/8");
        fx.enable("no debug bgp zebra prefix 10.0.0.0/8");

        assert!(fx.registry.list(ListId::Zebra).unwrap().is_empty());
        assert_eq!(fx.registry.list(ListId::NeighborEvents).unwrap().len(), 1);
        assert!(fx.registry.should_trace_neighbor_event(Some(&*fx.peer1)));
    }

    #[test]
    fn test_show_debugging_output() {
        let mut fx = Fixture::new();
        fx.enable("debug bgp neighbor-events 10.0.0.1");
        fx.enable("debug bgp neighbor-events swp1");
        fx.enable("debug bgp updates out");
        fx.enable("debug bgp as4 segment");

        assert_eq!(
            show_debugging(&fx.registry),
            vec![
                "BGP debugging status:",
                "  BGP as4 aspath segment debugging is on",
                "  BGP neighbor-events debugging is on for 10.0.0.1 swp1",
                "  BGP updates debugging is on (outbound)",
                "",
            ]
        );
    }

    #[test]
    fn test_session_command_does_not_touch_config() {
        let mut fx = Fixture::new();
        fx.config("debug bgp updates");
        fx.enable("no debug bgp updates");

        assert!(fx
            .registry
            .config_enabled(Category::Update, DebugFlags::UPDATE_IN | DebugFlags::UPDATE_OUT));
        assert!(!fx
            .registry
            .session_enabled(Category::Update, DebugFlags::UPDATE_IN | DebugFlags::UPDATE_OUT));
    }

    #[test]
    fn test_session_filters_leave_saved_config_alone() {
        let mut fx = Fixture::new();
        fx.config("debug bgp keepalives");
        fx.config("debug bgp neighbor-events 10.0.0.1");
        fx.config("debug bgp updates prefix 10.0.0.0/8");
        let saved = write_config(&fx.registry);
        assert_eq!(
            saved,
            vec![
                "debug bgp keepalives",
                "debug bgp updates prefix 10.0.0.0/8",
                "debug bgp neighbor-events 10.0.0.1",
            ]
        );

        // session add narrows tracing but is not saved
        fx.enable("debug bgp keepalives 2001:db8::2");
        assert!(!fx.registry.should_trace_keepalive(Some(&*fx.peer1)));
        assert_eq!(write_config(&fx.registry), saved);

        // session removals empty the session lists only
        fx.enable("no debug bgp neighbor-events 10.0.0.1");
        fx.enable("no debug bgp updates prefix 10.0.0.0/8");
        assert!(!fx.registry.should_trace_neighbor_event(Some(&*fx.peer1)));
        assert!(!fx
            .registry
            .should_trace_update(None, Some(&prefix("10.0.0.0/8")), Direction::Inbound));
        assert!(fx
            .registry
            .config_enabled(Category::Update, DebugFlags::UPDATE_PREFIX));
        assert_eq!(write_config(&fx.registry), saved);

        // removing from the config node drops the saved entry too
        fx.config("no debug bgp updates prefix 10.0.0.0/8");
        assert_eq!(
            write_config(&fx.registry),
            vec!["debug bgp keepalives", "debug bgp neighbor-events 10.0.0.1"]
        );
    }
}
