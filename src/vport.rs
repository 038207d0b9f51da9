/*!
The virtual port table

A virtual port owns an action list and names a parent port. Sending a
packet to a virtual port runs its actions and continues at the parent,
until a physical port terminates the chain. Chains are followed at most
`MAX_CHAIN_DEPTH` hops.
*/

use action::VPortAction;
use openflow::messages::*;

use std::collections::BTreeMap;

/// Default size of the virtual port table
pub const VPORT_TABLE_MAX_VPORTS: usize = 4096;
/// Most virtual ports a packet passes before it is dropped
pub const MAX_CHAIN_DEPTH: usize = 64;

/// An entry of the virtual port table
#[derive(Debug, Clone, PartialEq)]
pub struct VPortEntry {
    pub vport: u32,
    pub parent_port: u32,
    pub actions: Vec<VPortAction>,
    pub packet_count: u64,
    pub byte_count: u64,
}

/// What a packet entering a virtual port has to go through
#[derive(Debug, Clone, PartialEq)]
pub struct VPortHop {
    pub actions: Vec<VPortAction>,
    pub parent_port: u32,
}

#[derive(Debug)]
pub struct VPortTable {
    max_vports: usize,
    entries: BTreeMap<u32, VPortEntry>,
    lookup_count: u64,
    port_match_count: u64,
    chain_match_count: u64,
}

impl VPortTable {
    pub fn new(max_vports: usize) -> VPortTable {
        VPortTable {
            max_vports: max_vports,
            entries: BTreeMap::new(),
            lookup_count: 0,
            port_match_count: 0,
            chain_match_count: 0,
        }
    }

    pub fn max_vports(&self) -> usize {
        self.max_vports
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn lookup(&self, vport: u32) -> Option<&VPortEntry> {
        self.entries.get(&vport)
    }

    /// Adds a virtual port with a number from the virtual port range
    pub fn insert(
        &mut self,
        vport: u32,
        parent_port: u32,
        actions: Vec<VPortAction>,
    ) -> Result<(), OfpVportModFailedCode> {
        if !is_vport(vport) || vport == parent_port {
            return Err(OfpVportModFailedCode::BadVport);
        }
        if self.entries.contains_key(&vport) {
            return Err(OfpVportModFailedCode::Exists);
        }
        if self.entries.len() >= self.max_vports {
            return Err(OfpVportModFailedCode::TableFull);
        }
        debug!("Adding virtual port {:#x} with parent {:#x}", vport, parent_port);
        self.entries.insert(
            vport,
            VPortEntry {
                vport: vport,
                parent_port: parent_port,
                actions: actions,
                packet_count: 0,
                byte_count: 0,
            },
        );
        Ok(())
    }

    pub fn remove(&mut self, vport: u32) -> Result<VPortEntry, OfpVportModFailedCode> {
        debug!("Removing virtual port {:#x}", vport);
        self.entries
            .remove(&vport)
            .ok_or(OfpVportModFailedCode::Unknown)
    }

    /// Passes a packet of `bytes` through `vport` and tells where it goes next.
    /// `chained` is set for every hop after the first one of a chain.
    pub fn hop(&mut self, vport: u32, chained: bool, bytes: usize) -> Option<VPortHop> {
        self.lookup_count += 1;
        let entry = self.entries.get_mut(&vport)?;
        if chained {
            self.chain_match_count += 1;
        }
        else {
            self.port_match_count += 1;
        }
        entry.packet_count += 1;
        entry.byte_count += bytes as u64;
        Some(VPortHop {
            actions: entry.actions.clone(),
            parent_port: entry.parent_port,
        })
    }

    pub fn stats(&self) -> OfpVportTableStats {
        OfpVportTableStats {
            max_vports: self.max_vports as u32,
            active_vports: self.entries.len() as u32,
            lookup_count: self.lookup_count,
            port_match_count: self.port_match_count,
            chain_match_count: self.chain_match_count,
        }
    }

    pub fn features(&self) -> OfpVportTableFeatures {
        OfpVportTableFeatures {
            actions: OFP_SUPPORTED_VPORT_TABLE_ACTIONS,
            max_vports: self.max_vports as u32,
            max_chain_depth: MAX_CHAIN_DEPTH as u16,
            mixed_chaining: true,
        }
    }
}
