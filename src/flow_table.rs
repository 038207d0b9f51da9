/*!
Flow entries and the chain of flow tables they are stored in

The chain consults an exact match table before a wildcard table. Exact
entries therefore win over wildcard entries whatever their priority.
Inside the wildcard table the highest priority wins and entries of equal
priority are consulted in insertion order.
*/

use action::{self, Action};
use flow::{FlowKey, MatchKey};
use openflow::messages::*;
use sim::SimTime;

use std::collections::BTreeMap;
use std::time::Duration;

/// Default size of the exact match table
pub const EXACT_TABLE_MAX_FLOWS: usize = 65536;
/// Default size of the wildcard table
pub const WILDCARD_TABLE_MAX_FLOWS: usize = 100;

/// Priority every exact match entry gets
pub const EXACT_PRIORITY: u16 = 0xffff;

/// A rule of a flow table together with its counters
#[derive(Debug, Clone, PartialEq)]
pub struct FlowEntry {
    pub key: MatchKey,
    /// Only meaningful for wildcard entries
    pub priority: u16,
    pub cookie: u64,
    pub actions: Vec<Action>,
    /// Seconds without a match before the entry expires, 0 is permanent
    pub idle_timeout: u16,
    /// Seconds after creation when the entry expires, 0 is permanent
    pub hard_timeout: u16,
    /// OFPFF_* flags
    pub flags: u16,
    pub created: SimTime,
    pub used: SimTime,
    pub packet_count: u64,
    pub byte_count: u64,
}

impl FlowEntry {
    /// Constructs the entry a Flow-Mod add request describes
    pub fn from_flow_mod(flow_mod: &OfpFlowMod, now: SimTime) -> FlowEntry {
        let priority = if flow_mod.match_key.is_exact() {
            EXACT_PRIORITY
        }
        else {
            flow_mod.priority
        };
        FlowEntry {
            key: flow_mod.match_key,
            priority: priority,
            cookie: flow_mod.cookie,
            actions: flow_mod.actions.clone(),
            idle_timeout: flow_mod.idle_timeout,
            hard_timeout: flow_mod.hard_timeout,
            flags: flow_mod.flags,
            created: now,
            used: now,
            packet_count: 0,
            byte_count: 0,
        }
    }

    /// Accounts a packet of `bytes` that matched this entry
    pub fn used(&mut self, now: SimTime, bytes: usize) {
        self.used = now;
        self.packet_count += 1;
        self.byte_count += bytes as u64;
    }

    pub fn has_output_to(&self, port: u32) -> bool {
        action::outputs_to(&self.actions, port)
    }

    /// Tells whether and why this entry has expired
    pub fn expired(&self, now: SimTime) -> Option<OfpFlowExpiredReason> {
        let idle = Duration::from_secs(u64::from(self.idle_timeout));
        let hard = Duration::from_secs(u64::from(self.hard_timeout));
        if self.idle_timeout != 0 && now >= self.used + idle {
            Some(OfpFlowExpiredReason::IdleTimeout)
        }
        else if self.hard_timeout != 0 && now >= self.created + hard {
            Some(OfpFlowExpiredReason::HardTimeout)
        }
        else {
            None
        }
    }

    /// Whole seconds this entry has been installed
    pub fn duration_secs(&self, now: SimTime) -> u32 {
        now.checked_sub(self.created)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0)
    }

    /// Matches a strict request: same key, and the same priority for wildcard entries
    fn strictly_matches(&self, key: &MatchKey, priority: u16) -> bool {
        self.key.strictly_equals(key) && (self.key.is_exact() || self.priority == priority)
    }

    /// Matches a request by its key and wildcards, or strictly
    pub fn matches_request(&self, key: &MatchKey, priority: u16, strict: bool) -> bool {
        if strict {
            self.strictly_matches(key, priority)
        }
        else {
            key.matches(&self.key.flow)
        }
    }

    pub fn to_flow_expired(&self, now: SimTime, reason: OfpFlowExpiredReason) -> OfpFlowExpired {
        OfpFlowExpired {
            match_key: self.key,
            priority: self.priority,
            reason: reason as u8,
            duration: self.duration_secs(now),
            packet_count: self.packet_count,
            byte_count: self.byte_count,
        }
    }

    pub fn to_flow_stats(&self, table_id: u8, now: SimTime) -> OfpFlowStats {
        OfpFlowStats {
            table_id: table_id,
            match_key: self.key,
            duration_sec: self.duration_secs(now),
            priority: self.priority,
            idle_timeout: self.idle_timeout,
            hard_timeout: self.hard_timeout,
            cookie: self.cookie,
            packet_count: self.packet_count,
            byte_count: self.byte_count,
            actions: self.actions.clone(),
        }
    }
}

/// A single table of the chain
pub trait FlowTable {
    fn name(&self) -> &'static str;

    /// The OFPFW_* bits this table supports
    fn wildcards(&self) -> u32;

    fn max_flows(&self) -> usize;

    fn n_flows(&self) -> usize;

    /// Finds the entry `key` hits
    fn lookup(&mut self, key: &FlowKey) -> Option<&mut FlowEntry>;

    /// Adds an entry, replacing one with the same match and priority.
    /// Hands the entry back if this table cannot hold it.
    fn insert(&mut self, flow: FlowEntry) -> Result<(), FlowEntry>;

    /// Replaces the actions of the matching entries and returns their number
    fn modify(&mut self, key: &MatchKey, priority: u16, strict: bool, actions: &[Action]) -> usize;

    /// Removes the matching entries that output to `out_port` and returns their number
    fn delete(&mut self, key: &MatchKey, out_port: u32, priority: u16, strict: bool) -> usize;

    /// Removes the expired entries and returns them with the reason
    fn timeout(&mut self, now: SimTime) -> Vec<(FlowEntry, OfpFlowExpiredReason)>;

    fn iter<'a>(&'a self) -> Box<dyn Iterator<Item = &'a FlowEntry> + 'a>;
}

/// Entries without wildcards, found by their key
#[derive(Debug)]
pub struct ExactTable {
    max_flows: usize,
    flows: BTreeMap<FlowKey, FlowEntry>,
}

impl ExactTable {
    pub fn new(max_flows: usize) -> ExactTable {
        ExactTable {
            max_flows: max_flows,
            flows: BTreeMap::new(),
        }
    }
}

impl FlowTable for ExactTable {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn wildcards(&self) -> u32 {
        0
    }

    fn max_flows(&self) -> usize {
        self.max_flows
    }

    fn n_flows(&self) -> usize {
        self.flows.len()
    }

    fn lookup(&mut self, key: &FlowKey) -> Option<&mut FlowEntry> {
        self.flows.get_mut(key)
    }

    fn insert(&mut self, flow: FlowEntry) -> Result<(), FlowEntry> {
        if !flow.key.is_exact() {
            return Err(flow);
        }
        if !self.flows.contains_key(&flow.key.flow) && self.flows.len() >= self.max_flows {
            return Err(flow);
        }
        self.flows.insert(flow.key.flow, flow);
        Ok(())
    }

    fn modify(&mut self, key: &MatchKey, priority: u16, strict: bool, actions: &[Action]) -> usize {
        let mut count = 0;
        for flow in self.flows.values_mut() {
            if flow.matches_request(key, priority, strict) {
                flow.actions = actions.to_vec();
                count += 1;
            }
        }
        count
    }

    fn delete(&mut self, key: &MatchKey, out_port: u32, priority: u16, strict: bool) -> usize {
        let before = self.flows.len();
        self.flows.retain(|_, flow| {
            !(flow.matches_request(key, priority, strict) && flow.has_output_to(out_port))
        });
        before - self.flows.len()
    }

    fn timeout(&mut self, now: SimTime) -> Vec<(FlowEntry, OfpFlowExpiredReason)> {
        let expired: Vec<(FlowKey, OfpFlowExpiredReason)> = self
            .flows
            .iter()
            .filter_map(|(key, flow)| flow.expired(now).map(|reason| (*key, reason)))
            .collect();
        expired
            .into_iter()
            .filter_map(|(key, reason)| self.flows.remove(&key).map(|flow| (flow, reason)))
            .collect()
    }

    fn iter<'a>(&'a self) -> Box<dyn Iterator<Item = &'a FlowEntry> + 'a> {
        Box::new(self.flows.values())
    }
}

/// Entries with wildcards, ordered by descending priority
#[derive(Debug)]
pub struct WildcardTable {
    max_flows: usize,
    flows: Vec<FlowEntry>,
}

impl WildcardTable {
    pub fn new(max_flows: usize) -> WildcardTable {
        WildcardTable {
            max_flows: max_flows,
            flows: vec![],
        }
    }
}

impl FlowTable for WildcardTable {
    fn name(&self) -> &'static str {
        "wildcard"
    }

    fn wildcards(&self) -> u32 {
        OFPFW_ALL
    }

    fn max_flows(&self) -> usize {
        self.max_flows
    }

    fn n_flows(&self) -> usize {
        self.flows.len()
    }

    fn lookup(&mut self, key: &FlowKey) -> Option<&mut FlowEntry> {
        self.flows.iter_mut().find(|flow| flow.key.matches(key))
    }

    fn insert(&mut self, flow: FlowEntry) -> Result<(), FlowEntry> {
        if let Some(existing) = self
            .flows
            .iter_mut()
            .find(|f| f.key == flow.key && f.priority == flow.priority)
        {
            *existing = flow;
            return Ok(());
        }
        if self.flows.len() >= self.max_flows {
            return Err(flow);
        }
        // behind every entry of the same priority
        let pos = self
            .flows
            .iter()
            .position(|f| f.priority < flow.priority)
            .unwrap_or_else(|| self.flows.len());
        self.flows.insert(pos, flow);
        Ok(())
    }

    fn modify(&mut self, key: &MatchKey, priority: u16, strict: bool, actions: &[Action]) -> usize {
        let mut count = 0;
        for flow in &mut self.flows {
            if flow.matches_request(key, priority, strict) {
                flow.actions = actions.to_vec();
                count += 1;
            }
        }
        count
    }

    fn delete(&mut self, key: &MatchKey, out_port: u32, priority: u16, strict: bool) -> usize {
        let before = self.flows.len();
        self.flows.retain(|flow| {
            !(flow.matches_request(key, priority, strict) && flow.has_output_to(out_port))
        });
        before - self.flows.len()
    }

    fn timeout(&mut self, now: SimTime) -> Vec<(FlowEntry, OfpFlowExpiredReason)> {
        let mut expired = vec![];
        let mut kept = Vec::with_capacity(self.flows.len());
        for flow in self.flows.drain(..) {
            match flow.expired(now) {
                Some(reason) => expired.push((flow, reason)),
                None => kept.push(flow),
            }
        }
        self.flows = kept;
        expired
    }

    fn iter<'a>(&'a self) -> Box<dyn Iterator<Item = &'a FlowEntry> + 'a> {
        Box::new(self.flows.iter())
    }
}

struct ChainSlot {
    table: Box<dyn FlowTable>,
    lookup_count: u64,
    matched_count: u64,
}

/// The flow tables of a datapath, consulted in order
pub struct FlowChain {
    slots: Vec<ChainSlot>,
}

impl FlowChain {
    /// Constructs an exact match table followed by a wildcard table
    pub fn new(exact_max: usize, wildcard_max: usize) -> FlowChain {
        let tables: Vec<Box<dyn FlowTable>> = vec![
            Box::new(ExactTable::new(exact_max)),
            Box::new(WildcardTable::new(wildcard_max)),
        ];
        FlowChain {
            slots: tables
                .into_iter()
                .map(|table| ChainSlot {
                    table: table,
                    lookup_count: 0,
                    matched_count: 0,
                })
                .collect(),
        }
    }

    pub fn n_tables(&self) -> usize {
        self.slots.len()
    }

    pub fn table(&self, idx: usize) -> Option<&dyn FlowTable> {
        self.slots.get(idx).map(|slot| &*slot.table)
    }

    /// Finds the entry `key` hits in the first table that has one
    pub fn lookup(&mut self, key: &FlowKey) -> Option<&mut FlowEntry> {
        for slot in self.slots.iter_mut() {
            let ChainSlot {
                ref mut table,
                ref mut lookup_count,
                ref mut matched_count,
            } = *slot;
            *lookup_count += 1;
            if let Some(flow) = table.lookup(key) {
                *matched_count += 1;
                return Some(flow);
            }
        }
        None
    }

    /// Adds an entry to the first table that accepts it.
    /// Exact entries go to the wildcard table once the exact table is full.
    /// An entry with the same match and priority is replaced in whichever table holds it.
    pub fn insert(&mut self, flow: FlowEntry) -> Result<(), FlowEntry> {
        let holder = self.slots.iter().position(|slot| {
            slot.table
                .iter()
                .any(|f| f.key == flow.key && f.priority == flow.priority)
        });
        if let Some(idx) = holder {
            return self.slots[idx].table.insert(flow);
        }
        let mut flow = flow;
        for slot in &mut self.slots {
            match slot.table.insert(flow) {
                Ok(()) => return Ok(()),
                Err(rejected) => flow = rejected,
            }
        }
        Err(flow)
    }

    pub fn modify(&mut self, key: &MatchKey, priority: u16, strict: bool, actions: &[Action]) -> usize {
        self.slots
            .iter_mut()
            .map(|slot| slot.table.modify(key, priority, strict, actions))
            .sum()
    }

    pub fn delete(&mut self, key: &MatchKey, out_port: u32, priority: u16, strict: bool) -> usize {
        self.slots
            .iter_mut()
            .map(|slot| slot.table.delete(key, out_port, priority, strict))
            .sum()
    }

    /// Removes every expired entry
    pub fn sweep_expired(&mut self, now: SimTime) -> Vec<(FlowEntry, OfpFlowExpiredReason)> {
        let mut expired = vec![];
        for slot in &mut self.slots {
            expired.extend(slot.table.timeout(now));
        }
        expired
    }

    /// Visits the entries `key` covers that output to `out_port`.
    /// `table_id` selects a single table or all of them with OFPTT_ALL.
    pub fn for_each_matching<F>(&self, key: &MatchKey, out_port: u32, table_id: u8, mut visitor: F)
    where
        F: FnMut(usize, &FlowEntry),
    {
        for (idx, slot) in self.slots.iter().enumerate() {
            if table_id != OFPTT_ALL && usize::from(table_id) != idx {
                continue;
            }
            for flow in slot.table.iter() {
                if key.matches(&flow.key.flow) && flow.has_output_to(out_port) {
                    visitor(idx, flow);
                }
            }
        }
    }

    pub fn table_stats(&self) -> Vec<OfpTableStats> {
        self.slots
            .iter()
            .enumerate()
            .map(|(idx, slot)| OfpTableStats {
                table_id: idx as u8,
                name: slot.table.name().to_owned(),
                wildcards: slot.table.wildcards(),
                max_entries: slot.table.max_flows() as u32,
                active_count: slot.table.n_flows() as u32,
                lookup_count: slot.lookup_count,
                matched_count: slot.matched_count,
            })
            .collect()
    }

    pub fn n_flows(&self) -> usize {
        self.slots.iter().map(|slot| slot.table.n_flows()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packet::MacAddr;

    const MAC_A: MacAddr = MacAddr([0, 0, 0, 0, 0, 0xa]);
    const MAC_B: MacAddr = MacAddr([0, 0, 0, 0, 0, 0xb]);

    fn key() -> FlowKey {
        FlowKey {
            in_port: 0,
            dl_src: MAC_A,
            dl_dst: MAC_B,
            dl_vlan: OFP_VLAN_NONE,
            dl_type: 0x0800,
            nw_src: 0x0a00_0001,
            nw_dst: 0x0a00_0002,
            nw_proto: 17,
            tp_src: 1000,
            tp_dst: 2000,
            mpls_label1: MPLS_INVALID_LABEL,
            mpls_label2: MPLS_INVALID_LABEL,
        }
    }

    fn output(port: u32) -> Vec<Action> {
        vec![Action::Output {
            port: port,
            max_len: 0,
        }]
    }

    fn entry(key: MatchKey, priority: u16, actions: Vec<Action>) -> FlowEntry {
        let flow_mod = OfpFlowMod::new(OfpFlowModCommand::Add, key, priority, actions);
        FlowEntry::from_flow_mod(&flow_mod, Duration::from_secs(0))
    }

    fn dl_dst_match() -> MatchKey {
        MatchKey::new(OFPFW_ALL & !OFPFW_DL_DST, key())
    }

    #[test]
    fn exact_entry_is_found_repeatedly() {
        let mut testee = FlowChain::new(10, 10);
        testee.insert(entry(MatchKey::exact(key()), 1, output(1))).unwrap();
        for _ in 0..3 {
            let flow = testee.lookup(&key()).unwrap();
            assert_eq!(EXACT_PRIORITY, flow.priority);
            assert_eq!(0, flow.packet_count);
        }
        let stats = testee.table_stats();
        assert_eq!(3, stats[0].lookup_count);
        assert_eq!(3, stats[0].matched_count);
        assert_eq!(0, stats[1].lookup_count);
    }

    #[test]
    fn exact_wins_over_wildcard() {
        let mut testee = FlowChain::new(10, 10);
        testee.insert(entry(dl_dst_match(), 0xfffe, output(2))).unwrap();
        testee.insert(entry(MatchKey::exact(key()), 0, output(1))).unwrap();
        assert_eq!(output(1), testee.lookup(&key()).unwrap().actions);
    }

    #[test]
    fn swapped_addresses_miss() {
        let mut testee = FlowChain::new(10, 10);
        testee.insert(entry(MatchKey::exact(key()), 0, output(1))).unwrap();
        let mut swapped = key();
        swapped.dl_src = MAC_B;
        swapped.dl_dst = MAC_A;
        assert!(testee.lookup(&swapped).is_none());
        assert_eq!(1, testee.table_stats()[1].lookup_count);
    }

    #[test]
    fn priority_order_then_insertion_order() {
        let mut testee = WildcardTable::new(10);
        testee.insert(entry(MatchKey::all(), 10, output(1))).unwrap();
        testee.insert(entry(dl_dst_match(), 10, output(2))).unwrap();
        assert_eq!(output(1), testee.lookup(&key()).unwrap().actions);

        testee.insert(entry(dl_dst_match(), 20, output(3))).unwrap();
        assert_eq!(output(3), testee.lookup(&key()).unwrap().actions);
        assert_eq!(3, testee.n_flows());
    }

    #[test]
    fn same_match_and_priority_replaces() {
        let mut testee = WildcardTable::new(1);
        testee.insert(entry(dl_dst_match(), 10, output(1))).unwrap();
        testee.insert(entry(dl_dst_match(), 10, output(2))).unwrap();
        assert_eq!(1, testee.n_flows());
        assert_eq!(output(2), testee.lookup(&key()).unwrap().actions);
        assert!(testee.insert(entry(dl_dst_match(), 11, output(3))).is_err());
    }

    #[test]
    fn full_exact_table_spills_into_wildcard_table() {
        let mut testee = FlowChain::new(1, 1);
        let mut other = key();
        other.tp_src = 1;
        testee.insert(entry(MatchKey::exact(key()), 0, output(1))).unwrap();
        testee.insert(entry(MatchKey::exact(other), 0, output(2))).unwrap();
        assert_eq!(1, testee.table(1).unwrap().n_flows());
        assert_eq!(output(2), testee.lookup(&other).unwrap().actions);

        let rejected = entry(dl_dst_match(), 5, output(3));
        assert_eq!(Err(rejected.clone()), testee.insert(rejected));
    }

    #[test]
    fn re_added_spilled_entry_is_replaced_in_place() {
        let mut testee = FlowChain::new(1, 10);
        let mut other = key();
        other.tp_src = 1;
        testee.insert(entry(MatchKey::exact(key()), 0, output(1))).unwrap();
        testee.insert(entry(MatchKey::exact(other), 0, output(2))).unwrap();
        assert_eq!(1, testee.delete(&MatchKey::exact(key()), OFPP_NONE, 0, true));

        testee.insert(entry(MatchKey::exact(other), 0, output(3))).unwrap();
        let mut seen = vec![];
        testee.for_each_matching(&MatchKey::exact(other), OFPP_NONE, OFPTT_ALL, |idx, flow| {
            seen.push((idx, flow.actions.clone()))
        });
        assert_eq!(vec![(1, output(3))], seen);
        assert_eq!(1, testee.n_flows());
        assert_eq!(output(3), testee.lookup(&other).unwrap().actions);
    }

    #[test]
    fn strict_modify_replaces_actions() {
        let mut testee = FlowChain::new(10, 10);
        testee.insert(entry(dl_dst_match(), 10, output(1))).unwrap();
        assert_eq!(0, testee.modify(&dl_dst_match(), 11, true, &output(2)));
        assert_eq!(1, testee.modify(&dl_dst_match(), 10, true, &output(2)));
        let flow = testee.lookup(&key()).unwrap();
        assert_eq!(output(2), flow.actions);
        assert_eq!(10, flow.priority);
    }

    #[test]
    fn non_strict_modify_covers_narrower_entries() {
        let mut testee = FlowChain::new(10, 10);
        testee.insert(entry(MatchKey::exact(key()), 0, output(1))).unwrap();
        testee.insert(entry(dl_dst_match(), 10, output(1))).unwrap();
        testee.insert(entry(MatchKey::all(), 1, output(1))).unwrap();
        // covers the exact entry and the dl_dst entry, not the match-all entry
        assert_eq!(2, testee.modify(&dl_dst_match(), 0, false, &output(3)));
        assert_eq!(3, testee.modify(&MatchKey::all(), 0, false, &output(4)));
    }

    #[test]
    fn delete_filters_on_output_port() {
        let mut testee = FlowChain::new(10, 10);
        testee.insert(entry(dl_dst_match(), 10, output(1))).unwrap();
        testee.insert(entry(MatchKey::exact(key()), 0, output(2))).unwrap();
        assert_eq!(0, testee.delete(&MatchKey::all(), 3, 0, false));
        assert_eq!(1, testee.delete(&MatchKey::all(), 2, 0, false));
        assert_eq!(1, testee.n_flows());
        assert_eq!(1, testee.delete(&MatchKey::all(), OFPP_NONE, 0, false));
        assert_eq!(0, testee.n_flows());
    }

    #[test]
    fn strict_delete_of_exact_entry_ignores_priority() {
        let mut testee = FlowChain::new(10, 10);
        testee.insert(entry(MatchKey::exact(key()), 0, output(2))).unwrap();
        assert_eq!(1, testee.delete(&MatchKey::exact(key()), OFPP_NONE, 123, true));
    }

    #[test]
    fn sweep_removes_idle_and_hard_expired() {
        let mut testee = FlowChain::new(10, 10);
        let mut idle = entry(MatchKey::exact(key()), 0, output(1));
        idle.idle_timeout = 5;
        let mut hard = entry(dl_dst_match(), 10, output(1));
        hard.hard_timeout = 8;
        testee.insert(idle).unwrap();
        testee.insert(hard).unwrap();

        assert!(testee.sweep_expired(Duration::from_millis(4999)).is_empty());
        let expired = testee.sweep_expired(Duration::from_secs(5));
        assert_eq!(1, expired.len());
        assert_eq!(OfpFlowExpiredReason::IdleTimeout, expired[0].1);

        let expired = testee.sweep_expired(Duration::from_secs(9));
        assert_eq!(1, expired.len());
        assert_eq!(OfpFlowExpiredReason::HardTimeout, expired[0].1);
        assert_eq!(9, expired[0].0.duration_secs(Duration::from_secs(9)));
        assert_eq!(0, testee.n_flows());
    }

    #[test]
    fn use_postpones_idle_expiration() {
        let mut testee = entry(MatchKey::exact(key()), 0, output(1));
        testee.idle_timeout = 5;
        testee.used(Duration::from_secs(3), 100);
        assert_eq!(None, testee.expired(Duration::from_secs(7)));
        assert!(testee.expired(Duration::from_secs(8)).is_some());
        assert_eq!((1, 100), (testee.packet_count, testee.byte_count));
    }

    #[test]
    fn visit_matching_per_table() {
        let mut testee = FlowChain::new(10, 10);
        testee.insert(entry(MatchKey::exact(key()), 0, output(2))).unwrap();
        testee.insert(entry(dl_dst_match(), 10, output(1))).unwrap();
        let mut seen = vec![];
        testee.for_each_matching(&MatchKey::all(), OFPP_NONE, OFPTT_ALL, |idx, _| seen.push(idx));
        assert_eq!(vec![0, 1], seen);
        seen.clear();
        testee.for_each_matching(&MatchKey::all(), 1, OFPTT_ALL, |idx, _| seen.push(idx));
        assert_eq!(vec![1], seen);
        seen.clear();
        testee.for_each_matching(&MatchKey::all(), OFPP_NONE, 0, |idx, _| seen.push(idx));
        assert_eq!(vec![0], seen);
    }
}
