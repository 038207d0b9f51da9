/*!
The switch datapath

`SwitchDatapath` owns the flow chain, the virtual port table, the ports and
the packet buffer. Frames received on a port are classified after a
modeled lookup delay. Hits run the flow's actions, misses are buffered and
reported to the controller. Control messages are dispatched by type and
answered through the controller connection.
*/

use action::{self, Action, ActionSink};
use buffer::{BufferedPacket, PacketBuffer, N_PKT_BUFFERS};
use controller::Controller;
use flow::{FlowKey, MatchKey};
use flow_table::{FlowChain, FlowEntry, EXACT_PRIORITY, EXACT_TABLE_MAX_FLOWS, WILDCARD_TABLE_MAX_FLOWS};
use openflow::error::{Error, Result};
use openflow::messages::deserialize::{flow_mod_buffer_id, Deserialize};
use openflow::messages::serialize::OfpPacket;
use openflow::messages::*;
use packet::{MacAddr, Packet};
use port::{NetDevice, PortManager, MAX_PORTS};
use sim::{Scheduler, SimTime};
use stats::{DumpContext, StatsDump};
use vport::{VPortTable, MAX_CHAIN_DEPTH, VPORT_TABLE_MAX_VPORTS};

use std::collections::VecDeque;
use std::time::Duration;

/// Modeled latency of a flow table lookup
pub const DEFAULT_LOOKUP_DELAY_NS: u64 = 30;

const MAINTENANCE_INTERVAL: Duration = Duration::from_secs(1);

/// Destination of spanning tree BPDUs
pub const STP_ETH_ADDR: MacAddr = MacAddr([0x01, 0x80, 0xc2, 0x00, 0x00, 0x00]);

pub const OFP_SUPPORTED_CAPABILITIES: u32 = OFPC_FLOW_STATS
    | OFPC_TABLE_STATS
    | OFPC_PORT_STATS
    | OFPC_MULTI_PHY_TX
    | OFPC_VPORT_TABLE;

/// How a device classified a received frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PacketType {
    /// Addressed to the receiving device
    Host,
    Broadcast,
    Multicast,
    /// Addressed to another host, seen in promiscuous mode
    OtherHost,
}

/// A received packet waiting for its flow table lookup
#[derive(Debug, Clone, PartialEq)]
pub struct PendingLookup {
    pub port_no: u32,
    pub packet: Packet,
    pub key: FlowKey,
}

/// Work a switch schedules for later
#[derive(Debug, Clone, PartialEq)]
pub enum DatapathEvent {
    FlowLookup(PendingLookup),
}

/// Static settings of a switch
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchConfig {
    pub datapath_id: u64,
    pub lookup_delay: Duration,
    /// Initial OFPC_* configuration flags
    pub flags: u16,
    pub miss_send_len: u16,
    pub exact_max: usize,
    pub wildcard_max: usize,
    pub max_vports: usize,
    pub max_ports: usize,
    pub desc: OfpDescStats,
}

impl Default for SwitchConfig {
    fn default() -> Self {
        SwitchConfig {
            datapath_id: 0,
            lookup_delay: Duration::from_nanos(DEFAULT_LOOKUP_DELAY_NS),
            flags: OFPC_FRAG_NORMAL,
            miss_send_len: OFP_DEFAULT_MISS_SEND_LEN,
            exact_max: EXACT_TABLE_MAX_FLOWS,
            wildcard_max: WILDCARD_TABLE_MAX_FLOWS,
            max_vports: VPORT_TABLE_MAX_VPORTS,
            max_ports: MAX_PORTS,
            desc: OfpDescStats {
                mfr_desc: "The ofswitch developers".to_string(),
                hw_desc: "N/A".to_string(),
                sw_desc: "Simulated OpenFlow Switch".to_string(),
                serial_num: "N/A".to_string(),
            },
        }
    }
}

pub struct SwitchDatapath {
    datapath_id: u64,
    lookup_delay: Duration,
    desc: OfpDescStats,
    flags: u16,
    miss_send_len: u16,
    address: Option<MacAddr>,
    chain: FlowChain,
    vports: VPortTable,
    ports: PortManager,
    buffer: PacketBuffer,
    controller: Option<Box<dyn Controller>>,
    /// Controller messages not yet dispatched
    inbox: VecDeque<Vec<u8>>,
    now: SimTime,
    last_maintenance: SimTime,
    local_packets: u64,
}

impl SwitchDatapath {
    pub fn new(config: SwitchConfig) -> SwitchDatapath {
        info!("Creating switch with datapath id {:#018x}", config.datapath_id);
        SwitchDatapath {
            datapath_id: config.datapath_id,
            lookup_delay: config.lookup_delay,
            desc: config.desc,
            flags: config.flags,
            miss_send_len: config.miss_send_len,
            address: None,
            chain: FlowChain::new(config.exact_max, config.wildcard_max),
            vports: VPortTable::new(config.max_vports),
            ports: PortManager::new(config.max_ports),
            buffer: PacketBuffer::new(),
            controller: None,
            inbox: VecDeque::new(),
            now: Duration::from_secs(0),
            last_maintenance: Duration::from_secs(0),
            local_packets: 0,
        }
    }

    pub fn datapath_id(&self) -> u64 {
        self.datapath_id
    }

    /// The switch's own address, taken from the first attached port
    pub fn address(&self) -> Option<MacAddr> {
        self.address
    }

    pub fn flags(&self) -> u16 {
        self.flags
    }

    pub fn miss_send_len(&self) -> u16 {
        self.miss_send_len
    }

    pub fn ports(&self) -> &PortManager {
        &self.ports
    }

    pub fn flow_chain(&self) -> &FlowChain {
        &self.chain
    }

    pub fn vports(&self) -> &VPortTable {
        &self.vports
    }

    pub fn buffered_packets(&self) -> usize {
        self.buffer.len()
    }

    /// Frames addressed to the switch itself
    pub fn local_packets(&self) -> u64 {
        self.local_packets
    }

    /// Connects the switch to `controller`. A switch has at most one controller.
    pub fn set_controller(&mut self, controller: Box<dyn Controller>) -> bool {
        if self.controller.is_some() {
            error!("Switch {:#x} already has a controller", self.datapath_id);
            return false;
        }
        let mut controller = controller;
        controller.add_switch(self.datapath_id);
        self.controller = Some(controller);
        true
    }

    pub fn attach_port(&mut self, device: Box<dyn NetDevice>) -> Result<u32> {
        let address = device.address();
        let port_no = self.ports.attach(device)?;
        if self.address.is_none() {
            self.address = Some(address);
        }
        info!("Attached port {} to switch {:#x}", port_no, self.datapath_id);
        if self.controller.is_some() {
            self.send_port_status(port_no, OfpPortReason::Add);
            self.drain_inbox();
        }
        Ok(port_no)
    }

    /// Entry point for frames the device of `port_no` received
    pub fn receive_from_device<S: Scheduler + ?Sized>(
        &mut self,
        sched: &mut S,
        port_no: u32,
        frame: Vec<u8>,
        packet_type: PacketType,
    ) {
        self.now = sched.now();
        if self.ports.get(port_no).is_none() {
            warn!("Dropping frame from unknown port {}", port_no);
            return;
        }
        match Packet::parse(frame) {
            Some(packet) => {
                if packet_type == PacketType::Host && Some(packet.eth_dst()) == self.address {
                    trace!("Frame on port {} is addressed to the switch", port_no);
                    if let Some(port) = self.ports.get_mut(port_no) {
                        port.received(packet.len());
                    }
                    self.local_packets += 1;
                }
                else {
                    self.classify(sched, port_no, packet);
                }
            }
            None => debug!("Dropping runt frame received on port {}", port_no),
        }
        self.maintain();
        self.drain_inbox();
    }

    /// Runs the receive checks and schedules the flow table lookup
    fn classify<S: Scheduler + ?Sized>(&mut self, sched: &mut S, port_no: u32, packet: Packet) {
        let key = FlowKey::extract(&packet, port_no);
        let port = match self.ports.get_mut(port_no) {
            Some(port) => port,
            None => return,
        };
        port.received(packet.len());

        if packet.layers().fragment && self.flags & OFPC_FRAG_MASK == OFPC_FRAG_DROP {
            trace!("Dropping fragment received on port {}", port_no);
            return;
        }
        if packet.mpls_ttl() == Some(1) {
            debug!("Dropping MPLS packet with TTL 1 received on port {}", port_no);
            port.mpls_ttl0_dropped += 1;
            return;
        }
        let no_recv = if key.dl_dst == STP_ETH_ADDR {
            OFPPC_NO_RECV_STP
        }
        else {
            OFPPC_NO_RECV
        };
        if port.config & no_recv != 0 {
            trace!("Port {} does not receive this traffic", port_no);
            return;
        }
        sched.schedule_after(
            self.lookup_delay,
            DatapathEvent::FlowLookup(PendingLookup {
                port_no: port_no,
                packet: packet,
                key: key,
            }),
        );
    }

    /// Runs an event the switch scheduled before
    pub fn handle_event<S: Scheduler + ?Sized>(&mut self, sched: &mut S, event: DatapathEvent) {
        self.now = sched.now();
        match event {
            DatapathEvent::FlowLookup(pending) => {
                if self.ports.get(pending.port_no).is_some() {
                    self.run_through_flow_table(pending.packet, pending.key, true);
                }
                else {
                    debug!("Port {} vanished before the lookup", pending.port_no);
                }
            }
        }
        self.drain_inbox();
    }

    /// Entry point for messages the controller sends
    pub fn forward_control_input<S: Scheduler + ?Sized>(&mut self, sched: &mut S, msg: &[u8]) {
        self.now = sched.now();
        self.inbox.push_back(msg.to_vec());
        self.drain_inbox();
    }

    /// Tells the controller that every port is gone and disconnects it
    pub fn shutdown(&mut self) {
        let port_nos: Vec<u32> = self.ports.iter().map(|port| port.port_no).collect();
        for port_no in port_nos {
            self.send_port_status(port_no, OfpPortReason::Delete);
        }
        self.inbox.clear();
        self.controller = None;
        info!("Switch {:#x} shut down", self.datapath_id);
    }

    fn maintain(&mut self) {
        if self.now < self.last_maintenance + MAINTENANCE_INTERVAL {
            return;
        }
        self.last_maintenance = self.now;
        for port_no in self.ports.poll_and_diff() {
            self.send_port_status(port_no, OfpPortReason::Modify);
        }
        for (flow, reason) in self.chain.sweep_expired(self.now) {
            info!(
                "Flow [{} -> {}] expired ({:?})",
                flow.key.flow.dl_src, flow.key.flow.dl_dst, reason
            );
            let expired = flow.to_flow_expired(self.now, reason);
            self.send_to_controller(&expired, 0);
        }
    }

    fn drain_inbox(&mut self) {
        while let Some(msg) = self.inbox.pop_front() {
            if let Err(e) = self.handle_ofp_message(&msg) {
                self.handle_of_errors(e, &msg);
            }
        }
    }

    fn run_through_flow_table(&mut self, packet: Packet, key: FlowKey, send_to_controller: bool) {
        let now = self.now;
        let actions = self.chain.lookup(&key).map(|flow| {
            flow.used(now, packet.len());
            flow.actions.clone()
        });
        match actions {
            Some(actions) => {
                trace!("Flow matched packet from port {}", key.in_port);
                let mut packet = packet;
                let mut key = key;
                action::execute_actions(self, &mut packet, &mut key, &actions, false);
            }
            None if send_to_controller => {
                trace!("Flow not matched, sending to controller");
                let max_len = self.miss_send_len;
                self.output_control(packet, key.in_port, max_len, OfpPacketInReason::NoMatch);
            }
            None => trace!("Flow not matched"),
        }
    }

    /// Buffers `packet` and sends a Packet-In with up to `max_len` bytes of it
    fn output_control(&mut self, packet: Packet, in_port: u32, max_len: u16, reason: OfpPacketInReason) {
        if self.controller.is_none() {
            trace!("No controller for the Packet-In, dropping");
            return;
        }
        if let Some(port) = self.ports.get(in_port) {
            if port.config & OFPPC_NO_PACKET_IN != 0 {
                debug!("Port {} does not send Packet-In", in_port);
                return;
            }
        }
        let total_len = packet.len();
        let mut data = packet.data().to_vec();
        if max_len != 0 && data.len() > usize::from(max_len) {
            data.truncate(usize::from(max_len));
        }
        let buffer_id = self.buffer.save(packet, in_port);
        let packet_in = OfpPacketIn {
            buffer_id: buffer_id,
            total_len: total_len as u16,
            reason: reason as u8,
            in_port: in_port,
            data: data,
        };
        self.send_to_controller(&packet_in, 0);
    }

    fn output_packet(&mut self, packet: Packet, port_no: u32, ignore_no_fwd: bool) {
        match self.ports.get_mut(port_no) {
            Some(port) => {
                port.transmit(packet, ignore_no_fwd);
            }
            None => warn!("Can't forward to bad port {}", port_no),
        }
    }

    /// Sends `packet` to every port but `in_port`
    fn output_all(&mut self, packet: &Packet, in_port: u32, flood: bool) {
        let targets: Vec<u32> = self
            .ports
            .iter()
            .filter(|port| port.port_no != in_port)
            .filter(|port| !flood || port.config & OFPPC_NO_FLOOD == 0)
            .map(|port| port.port_no)
            .collect();
        for port_no in targets {
            self.output_packet(packet.clone(), port_no, false);
        }
    }

    fn run_through_vport_table(&mut self, packet: Packet, key: FlowKey, vport: u32, ignore_no_fwd: bool) {
        let mut packet = packet;
        let mut key = key;
        let mut current = vport;
        for depth in 0..MAX_CHAIN_DEPTH {
            let hop = match self.vports.hop(current, depth > 0, packet.len()) {
                Some(hop) => hop,
                None => {
                    warn!("Dropping packet sent to unknown virtual port {:#x}", current);
                    return;
                }
            };
            action::execute_vport_actions(self, &mut packet, &mut key, &hop.actions, ignore_no_fwd);
            if !is_vport(hop.parent_port) {
                self.output(&packet, &key, hop.parent_port, 0, ignore_no_fwd);
                return;
            }
            current = hop.parent_port;
        }
        warn!(
            "Dropping packet that passed {} virtual ports starting at {:#x}",
            MAX_CHAIN_DEPTH, vport
        );
    }

    fn handle_ofp_message(&mut self, msg: &[u8]) -> Result<()> {
        let header = OfpHeader::from_message(msg)?;
        debug!("Incoming message: {:?}", header);
        if header.version != OFP_VERSION {
            return Err(Error::BadRequest(OfpBadRequestCode::BadVersion));
        }
        let len = usize::from(header.length);
        if len < OfpHeader::header_length() || len > msg.len() {
            return Err(Error::BadRequest(OfpBadRequestCode::BadLen));
        }
        let body = &msg[OfpHeader::header_length()..len];
        let typ = OfpType::from_u8(header.typ).ok_or(Error::BadRequest(OfpBadRequestCode::BadType))?;
        match typ {
            OfpType::Hello => {
                let mut reply = vec![];
                OfpHeader::new(OfpType::Hello, header.xid).serialize(&mut reply)?;
                self.deliver(reply);
            }
            OfpType::EchoRequest => {
                let request = OfpEchoRequest::deserialize(body)?;
                self.send_to_controller(&OfpEchoReply::new(request.arbitrary), header.xid);
            }
            OfpType::EchoReply => trace!("Echo reply {}", header.xid),
            OfpType::FeaturesRequest => {
                let features = self.features();
                self.send_to_controller(&features, header.xid);
            }
            OfpType::GetConfigRequest => {
                let config = OfpGetConfigReply {
                    flags: self.flags,
                    miss_send_len: self.miss_send_len,
                };
                self.send_to_controller(&config, header.xid);
            }
            OfpType::SetConfig => self.receive_set_config(&OfpSetConfig::deserialize(body)?),
            OfpType::PacketOut => self.receive_packet_out(OfpPacketOut::deserialize(body)?)?,
            OfpType::FlowMod => match OfpFlowMod::deserialize(body) {
                Ok(flow_mod) => self.receive_flow_mod(flow_mod)?,
                Err(e) => {
                    // the buffered packet of a malformed request is released all the same
                    if let Some(buffer_id) = flow_mod_buffer_id(body) {
                        self.discard_buffer(buffer_id);
                    }
                    return Err(e);
                }
            },
            OfpType::PortMod => self.ports.apply_port_mod(&OfpPortMod::deserialize(body)?)?,
            OfpType::StatsRequest => {
                self.receive_stats_request(&OfpStatsRequest::deserialize(body)?, header.xid)?
            }
            OfpType::VportMod => self.receive_vport_mod(OfpVportMod::deserialize(body)?)?,
            OfpType::VportTableFeaturesRequest => {
                let features = self.vports.features();
                self.send_to_controller(&features, header.xid);
            }
            _ => {
                debug!("Switch cannot handle messages of type {:?}", typ);
                return Err(Error::BadRequest(OfpBadRequestCode::BadType));
            }
        }
        Ok(())
    }

    /// Reports a failed control message to the controller, or logs it if it stays local
    fn handle_of_errors(&mut self, error: Error, msg: &[u8]) {
        let xid = OfpHeader::from_message(msg).map(|header| header.xid).unwrap_or(0);
        match error.to_error_msg(msg) {
            Some(reply) => {
                debug!("Replying with {}", reply);
                self.send_to_controller(&reply, xid);
            }
            None => match error {
                Error::BufferUnknown(id) => {
                    debug!("Buffer {:#x} was consumed or recycled", id)
                }
                e => error!("Failed to handle control message {}: {}", xid, e),
            },
        }
    }

    fn features(&self) -> OfpSwitchFeatures {
        OfpSwitchFeatures {
            datapath_id: self.datapath_id,
            n_buffers: N_PKT_BUFFERS as u32,
            n_tables: self.chain.n_tables() as u8,
            capabilities: OFP_SUPPORTED_CAPABILITIES,
            actions: OFP_SUPPORTED_ACTIONS,
            ports: self.ports.descs(),
        }
    }

    fn receive_set_config(&mut self, config: &OfpSetConfig) {
        let mut flags = config.flags & (OFPC_SEND_FLOW_EXP | OFPC_FRAG_MASK);
        let frag = flags & OFPC_FRAG_MASK;
        if frag != OFPC_FRAG_NORMAL && frag != OFPC_FRAG_DROP {
            flags = (flags & !OFPC_FRAG_MASK) | OFPC_FRAG_DROP;
        }
        debug!(
            "Config flags {:#x}, miss_send_len {}",
            flags, config.miss_send_len
        );
        self.flags = flags;
        self.miss_send_len = config.miss_send_len;
    }

    fn receive_packet_out(&mut self, packet_out: OfpPacketOut) -> Result<()> {
        let mut packet = if packet_out.buffer_id == OFP_NO_BUFFER {
            Packet::parse(packet_out.data).ok_or(Error::BadRequest(OfpBadRequestCode::BadLen))?
        }
        else {
            self.buffer
                .retrieve(packet_out.buffer_id)
                .ok_or(Error::BufferUnknown(packet_out.buffer_id))?
                .packet
        };
        let mut key = FlowKey::extract(&packet, packet_out.in_port);
        action::validate_actions(&packet_out.actions, &MatchKey::exact(key), true)?;
        action::execute_actions(self, &mut packet, &mut key, &packet_out.actions, true);
        Ok(())
    }

    fn discard_buffer(&mut self, buffer_id: u32) {
        if buffer_id != OFP_NO_BUFFER && self.buffer.discard(buffer_id) {
            debug!("Discarded buffer {:#x}", buffer_id);
        }
    }

    fn take_buffer(&mut self, buffer_id: u32) -> Option<BufferedPacket> {
        if buffer_id == OFP_NO_BUFFER {
            None
        }
        else {
            self.buffer.retrieve(buffer_id)
        }
    }

    /// Runs `actions` against the packet a Flow-Mod referenced
    fn replay_buffer(&mut self, buffer_id: u32, buffered: Option<BufferedPacket>, actions: &[Action]) -> Result<()> {
        match buffered {
            Some(BufferedPacket { mut packet, in_port }) => {
                let mut key = FlowKey::extract(&packet, in_port);
                action::execute_actions(self, &mut packet, &mut key, actions, false);
                Ok(())
            }
            None if buffer_id == OFP_NO_BUFFER => Ok(()),
            None => Err(Error::BufferUnknown(buffer_id)),
        }
    }

    fn receive_flow_mod(&mut self, flow_mod: OfpFlowMod) -> Result<()> {
        let command = OfpFlowModCommand::from_u16(flow_mod.command)
            .ok_or(Error::FlowModFailed(OfpFlowModFailedCode::BadCommand))?;
        let priority = if flow_mod.match_key.is_exact() {
            EXACT_PRIORITY
        }
        else {
            flow_mod.priority
        };
        match command {
            OfpFlowModCommand::Add | OfpFlowModCommand::Modify | OfpFlowModCommand::ModifyStrict => {
                if let Err(code) = action::validate_actions(&flow_mod.actions, &flow_mod.match_key, false) {
                    self.discard_buffer(flow_mod.buffer_id);
                    return Err(Error::BadAction(code));
                }
            }
            _ => {}
        }

        match command {
            OfpFlowModCommand::Add => {
                let buffered = self.take_buffer(flow_mod.buffer_id);
                let mut flow = FlowEntry::from_flow_mod(&flow_mod, self.now);
                if let Some(ref buffered) = buffered {
                    flow.used(self.now, buffered.packet.len());
                }
                if self.chain.insert(flow).is_err() {
                    debug!("No table has room for another flow");
                    return Err(Error::FlowModFailed(OfpFlowModFailedCode::AllTablesFull));
                }
                debug!("Added flow with priority {}", priority);
                self.replay_buffer(flow_mod.buffer_id, buffered, &flow_mod.actions)
            }
            OfpFlowModCommand::Modify | OfpFlowModCommand::ModifyStrict => {
                let strict = command == OfpFlowModCommand::ModifyStrict;
                let n = self.chain.modify(&flow_mod.match_key, priority, strict, &flow_mod.actions);
                debug!("Modified {} flows", n);
                let buffered = self.take_buffer(flow_mod.buffer_id);
                self.replay_buffer(flow_mod.buffer_id, buffered, &flow_mod.actions)
            }
            OfpFlowModCommand::Delete | OfpFlowModCommand::DeleteStrict => {
                let strict = command == OfpFlowModCommand::DeleteStrict;
                let n = self
                    .chain
                    .delete(&flow_mod.match_key, flow_mod.out_port, priority, strict);
                debug!("Deleted {} flows", n);
                Ok(())
            }
        }
    }

    fn receive_vport_mod(&mut self, vport_mod: OfpVportMod) -> Result<()> {
        if vport_mod.command == OfpVportModCommand::Add as u16 {
            action::validate_vport_actions(&vport_mod.actions)?;
            self.vports
                .insert(vport_mod.vport, vport_mod.parent_port, vport_mod.actions)
                .map_err(Error::VportModFailed)
        }
        else if vport_mod.command == OfpVportModCommand::Delete as u16 {
            self.vports
                .remove(vport_mod.vport)
                .map(|_| ())
                .map_err(Error::VportModFailed)
        }
        else {
            Err(Error::VportModFailed(OfpVportModFailedCode::BadCommand))
        }
    }

    fn receive_stats_request(&mut self, request: &OfpStatsRequest, xid: u32) -> Result<()> {
        let mut dump = StatsDump::init(request)?;
        debug!("Starting {:?} dump", dump.typ());
        loop {
            let mut body = vec![];
            let more = {
                let ctx = DumpContext {
                    chain: &self.chain,
                    ports: &self.ports,
                    vports: &self.vports,
                    desc: &self.desc,
                    now: self.now,
                };
                dump.dump(&ctx, &mut body)?
            };
            let reply = OfpStatsReply {
                typ: request.typ,
                flags: if more { OFPSF_REPLY_MORE } else { 0 },
                body: body,
            };
            self.send_to_controller(&reply, xid);
            if !more {
                break;
            }
        }
        dump.cleanup();
        Ok(())
    }

    fn send_port_status(&mut self, port_no: u32, reason: OfpPortReason) {
        let desc = match self.ports.get(port_no) {
            Some(port) => port.desc(),
            None => return,
        };
        let status = OfpPortStatus {
            reason: reason as u8,
            desc: desc,
        };
        self.send_to_controller(&status, 0);
    }

    fn send_to_controller<P: OfpPacket>(&mut self, packet: &P, xid: u32) {
        let mut msg = vec![];
        match packet.serialize(&mut msg, xid) {
            Ok(()) => self.deliver(msg),
            Err(e) => error!("Could not serialize message for the controller: {}", e),
        }
    }

    /// Hands `msg` to the controller and queues its answers
    fn deliver(&mut self, msg: Vec<u8>) {
        let replies = match self.controller {
            Some(ref mut controller) => controller.receive_from_switch(self.datapath_id, &msg),
            None => {
                trace!("No controller connected, dropping message");
                return;
            }
        };
        self.inbox.extend(replies);
    }
}

impl ActionSink for SwitchDatapath {
    fn output(&mut self, packet: &Packet, key: &FlowKey, out_port: u32, max_len: u16, ignore_no_fwd: bool) {
        let in_port = key.in_port;
        match out_port {
            OFPP_IN_PORT => self.output_packet(packet.clone(), in_port, ignore_no_fwd),
            OFPP_TABLE => self.run_through_flow_table(packet.clone(), *key, false),
            OFPP_FLOOD => self.output_all(packet, in_port, true),
            OFPP_ALL => self.output_all(packet, in_port, false),
            OFPP_CONTROLLER => {
                self.output_control(packet.clone(), in_port, max_len, OfpPacketInReason::Action)
            }
            p if is_vport(p) => self.run_through_vport_table(packet.clone(), *key, p, ignore_no_fwd),
            p if p == in_port => debug!("Can't directly forward to input port {}", p),
            p => self.output_packet(packet.clone(), p, ignore_no_fwd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use action::{ErAction, VPortAction, VendorAction};
    use byteorder::{ByteOrder, NetworkEndian};
    use openflow::messages::deserialize::deserialize_flow_stats;
    use packet::{encode_udp_frame, ETH_TYPE_MPLS};
    use port::tests::RecordingDevice;
    use sim::EventQueue;
    use stats::MAX_REPLY_BODY;

    use std::cell::RefCell;
    use std::net::Ipv4Addr;
    use std::rc::Rc;

    const MAC_A: MacAddr = MacAddr([0, 0, 0, 0, 0, 0xa]);
    const MAC_B: MacAddr = MacAddr([0, 0, 0, 0, 0, 0xb]);
    const MAC_C: MacAddr = MacAddr([0, 0, 0, 0, 0, 0xc]);
    const XID: u32 = 42;

    struct RecordingController {
        log: Rc<RefCell<Vec<Vec<u8>>>>,
    }

    impl Controller for RecordingController {
        fn add_switch(&mut self, _: u64) {}

        fn receive_from_switch(&mut self, _: u64, msg: &[u8]) -> Vec<Vec<u8>> {
            self.log.borrow_mut().push(msg.to_vec());
            vec![]
        }
    }

    struct Harness {
        dp: SwitchDatapath,
        queue: EventQueue<DatapathEvent>,
        devices: Vec<RecordingDevice>,
        log: Rc<RefCell<Vec<Vec<u8>>>>,
    }

    impl Harness {
        fn new(n_ports: u8) -> Harness {
            Harness::with_config(
                n_ports,
                SwitchConfig {
                    datapath_id: 7,
                    ..SwitchConfig::default()
                },
            )
        }

        fn with_config(n_ports: u8, config: SwitchConfig) -> Harness {
            let log = Rc::new(RefCell::new(vec![]));
            let mut dp = SwitchDatapath::new(config);
            assert!(dp.set_controller(Box::new(RecordingController { log: log.clone() })));
            let mut devices = vec![];
            for i in 0..n_ports {
                let device = RecordingDevice::new(i);
                dp.attach_port(Box::new(device.clone())).unwrap();
                devices.push(device);
            }
            Harness {
                dp: dp,
                queue: EventQueue::new(),
                devices: devices,
                log: log,
            }
        }

        fn control<P: OfpPacket>(&mut self, packet: &P) {
            let mut msg = vec![];
            packet.serialize(&mut msg, XID).unwrap();
            self.dp.forward_control_input(&mut self.queue, &msg);
        }

        fn receive(&mut self, port_no: u32, frame: Vec<u8>) {
            self.dp
                .receive_from_device(&mut self.queue, port_no, frame, PacketType::OtherHost);
            while let Some((_, event)) = self.queue.pop() {
                self.dp.handle_event(&mut self.queue, event);
            }
        }

        fn sent(&self, port: usize) -> Vec<Vec<u8>> {
            self.devices[port].sent.borrow().clone()
        }

        /// Bodies of the messages of `typ` the controller got, with their xids
        fn messages(&self, typ: OfpType) -> Vec<(u32, Vec<u8>)> {
            self.log
                .borrow()
                .iter()
                .filter(|msg| msg[1] == typ as u8)
                .map(|msg| (NetworkEndian::read_u32(&msg[4..8]), msg[8..].to_vec()))
                .collect()
        }

        fn errors(&self) -> Vec<(u32, OfpErrorMsg)> {
            self.messages(OfpType::Error)
                .into_iter()
                .map(|(xid, body)| (xid, OfpErrorMsg::deserialize(&body).unwrap()))
                .collect()
        }

        fn packet_ins(&self) -> Vec<OfpPacketIn> {
            self.messages(OfpType::PacketIn)
                .into_iter()
                .map(|(_, body)| OfpPacketIn::deserialize(&body).unwrap())
                .collect()
        }
    }

    fn frame(dst: MacAddr, src: MacAddr, payload_len: usize) -> Vec<u8> {
        encode_udp_frame(
            dst,
            src,
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 0, 2),
            1000,
            2000,
            &vec![0; payload_len],
        )
    }

    fn to_dst(dst: MacAddr) -> MatchKey {
        MatchKey::new(
            OFPFW_ALL & !OFPFW_DL_DST,
            FlowKey {
                dl_dst: dst,
                ..FlowKey::default()
            },
        )
    }

    fn output(port: u32) -> Action {
        Action::Output {
            port: port,
            max_len: 0,
        }
    }

    #[test]
    fn matched_frame_is_forwarded() {
        let mut h = Harness::new(2);
        h.control(&OfpFlowMod::new(
            OfpFlowModCommand::Add,
            to_dst(MAC_B),
            OFP_DEFAULT_PRIORITY,
            vec![output(1)],
        ));
        let f = frame(MAC_B, MAC_A, 10);
        h.receive(0, f.clone());

        assert_eq!(vec![f.clone()], h.sent(1));
        assert!(h.sent(0).is_empty());
        assert!(h.packet_ins().is_empty());
        let port = h.dp.ports().get(1).unwrap();
        assert_eq!(1, port.tx_packets);
        assert_eq!(f.len() as u64, port.tx_bytes);
        assert_eq!(1, h.dp.ports().get(0).unwrap().rx_packets);

        let mut counts = vec![];
        h.dp.flow_chain()
            .for_each_matching(&MatchKey::all(), OFPP_NONE, OFPTT_ALL, |_, flow| {
                counts.push((flow.packet_count, flow.byte_count))
            });
        assert_eq!(vec![(1, f.len() as u64)], counts);
    }

    #[test]
    fn miss_is_buffered_and_reported() {
        let mut h = Harness::new(2);
        let f = frame(MAC_B, MAC_A, 200);
        h.receive(0, f.clone());

        let packet_ins = h.packet_ins();
        assert_eq!(1, packet_ins.len());
        let packet_in = &packet_ins[0];
        assert_eq!(OfpPacketInReason::NoMatch as u8, packet_in.reason);
        assert_eq!(0, packet_in.in_port);
        assert_eq!(f.len(), packet_in.total_len as usize);
        assert_eq!(&f[..128], &packet_in.data[..]);
        assert_eq!(1, h.dp.buffered_packets());

        h.control(&OfpPacketOut::new_buffered(packet_in.buffer_id, 0, vec![output(1)]));
        assert_eq!(vec![f], h.sent(1));
        assert_eq!(0, h.dp.buffered_packets());

        // the buffer is consumed, the second reference fails without an error reply
        h.control(&OfpPacketOut::new_buffered(packet_in.buffer_id, 0, vec![output(1)]));
        assert_eq!(1, h.sent(1).len());
        assert!(h.errors().is_empty());
    }

    #[test]
    fn idle_flow_expires_once() {
        let mut h = Harness::new(2);
        let mut flow_mod = OfpFlowMod::new(
            OfpFlowModCommand::Add,
            to_dst(MAC_B),
            OFP_DEFAULT_PRIORITY,
            vec![output(1)],
        );
        flow_mod.idle_timeout = 5;
        h.control(&flow_mod);
        assert_eq!(1, h.dp.flow_chain().n_flows());

        h.queue.advance_to(Duration::from_secs(6));
        h.receive(0, frame(MAC_C, MAC_A, 10));
        h.queue.advance_to(Duration::from_secs(8));
        h.receive(0, frame(MAC_C, MAC_A, 10));

        let expired = h.messages(OfpType::FlowExpired);
        assert_eq!(1, expired.len());
        let expired = OfpFlowExpired::deserialize(&expired[0].1).unwrap();
        assert_eq!(OfpFlowExpiredReason::IdleTimeout as u8, expired.reason);
        assert_eq!(to_dst(MAC_B), expired.match_key);
        assert_eq!(0, h.dp.flow_chain().n_flows());
        assert!(h.sent(1).is_empty());
    }

    #[test]
    fn no_expiration_without_traffic() {
        let mut h = Harness::new(1);
        let mut flow_mod = OfpFlowMod::new(
            OfpFlowModCommand::Add,
            to_dst(MAC_B),
            OFP_DEFAULT_PRIORITY,
            vec![],
        );
        flow_mod.hard_timeout = 1;
        h.control(&flow_mod);
        h.queue.advance_to(Duration::from_secs(10));
        h.control(&OfpEchoRequest::new(vec![]));

        assert!(h.messages(OfpType::FlowExpired).is_empty());
        assert_eq!(1, h.dp.flow_chain().n_flows());
    }

    #[test]
    fn flow_mod_replays_buffered_packet() {
        let mut h = Harness::new(2);
        let f = frame(MAC_B, MAC_A, 10);
        h.receive(0, f.clone());
        let buffer_id = h.packet_ins()[0].buffer_id;

        let mut flow_mod = OfpFlowMod::new(
            OfpFlowModCommand::Add,
            to_dst(MAC_B),
            OFP_DEFAULT_PRIORITY,
            vec![output(1)],
        );
        flow_mod.buffer_id = buffer_id;
        h.control(&flow_mod);

        assert_eq!(vec![f.clone()], h.sent(1));
        assert_eq!(0, h.dp.buffered_packets());
        let mut counts = vec![];
        h.dp.flow_chain()
            .for_each_matching(&MatchKey::all(), OFPP_NONE, OFPTT_ALL, |_, flow| {
                counts.push((flow.packet_count, flow.byte_count))
            });
        assert_eq!(vec![(1, f.len() as u64)], counts);
    }

    #[test]
    fn modify_replaces_actions() {
        let mut h = Harness::new(3);
        h.control(&OfpFlowMod::new(
            OfpFlowModCommand::Add,
            to_dst(MAC_B),
            OFP_DEFAULT_PRIORITY,
            vec![output(1)],
        ));
        h.control(&OfpFlowMod::new(
            OfpFlowModCommand::ModifyStrict,
            to_dst(MAC_B),
            OFP_DEFAULT_PRIORITY,
            vec![output(2)],
        ));
        h.receive(0, frame(MAC_B, MAC_A, 10));

        assert!(h.sent(1).is_empty());
        assert_eq!(1, h.sent(2).len());
    }

    #[test]
    fn delete_filters_on_output_port() {
        let mut h = Harness::new(3);
        h.control(&OfpFlowMod::new(
            OfpFlowModCommand::Add,
            to_dst(MAC_B),
            OFP_DEFAULT_PRIORITY,
            vec![output(1)],
        ));
        h.control(&OfpFlowMod::new(
            OfpFlowModCommand::Add,
            to_dst(MAC_C),
            OFP_DEFAULT_PRIORITY,
            vec![output(2)],
        ));
        let mut delete = OfpFlowMod::new(OfpFlowModCommand::Delete, MatchKey::all(), 0, vec![]);
        delete.out_port = 2;
        h.control(&delete);

        assert_eq!(1, h.dp.flow_chain().n_flows());
        h.receive(0, frame(MAC_B, MAC_A, 10));
        assert_eq!(1, h.sent(1).len());
        assert!(h.errors().is_empty());
    }

    #[test]
    fn invalid_actions_are_rejected() {
        let mut h = Harness::new(2);
        h.receive(0, frame(MAC_B, MAC_A, 10));
        let buffer_id = h.packet_ins()[0].buffer_id;

        let mut flow_mod = OfpFlowMod::new(
            OfpFlowModCommand::Add,
            to_dst(MAC_B),
            OFP_DEFAULT_PRIORITY,
            vec![output(OFPP_TABLE)],
        );
        flow_mod.buffer_id = buffer_id;
        h.control(&flow_mod);

        let errors = h.errors();
        assert_eq!(1, errors.len());
        assert_eq!(XID, errors[0].0);
        assert_eq!(OfpErrorType::BadAction as u16, errors[0].1.typ);
        assert_eq!(OfpBadActionCode::BadOutPort as u16, errors[0].1.code);
        assert_eq!(0, h.dp.flow_chain().n_flows());
        assert_eq!(0, h.dp.buffered_packets());
    }

    #[test]
    fn full_tables_reject_add_and_drop_buffer() {
        let mut h = Harness::with_config(
            2,
            SwitchConfig {
                exact_max: 0,
                wildcard_max: 0,
                ..SwitchConfig::default()
            },
        );
        h.receive(0, frame(MAC_B, MAC_A, 10));
        let buffer_id = h.packet_ins()[0].buffer_id;
        assert_eq!(1, h.dp.buffered_packets());

        let mut flow_mod = OfpFlowMod::new(
            OfpFlowModCommand::Add,
            to_dst(MAC_B),
            OFP_DEFAULT_PRIORITY,
            vec![output(1)],
        );
        flow_mod.buffer_id = buffer_id;
        h.control(&flow_mod);

        let codes: Vec<(u32, u16, u16)> = h.errors().into_iter().map(|(xid, e)| (xid, e.typ, e.code)).collect();
        assert_eq!(
            vec![(
                XID,
                OfpErrorType::FlowModFailed as u16,
                OfpFlowModFailedCode::AllTablesFull as u16
            )],
            codes
        );
        assert_eq!(0, h.dp.flow_chain().n_flows());
        assert_eq!(0, h.dp.buffered_packets());
        assert!(h.sent(0).is_empty());
        assert!(h.sent(1).is_empty());
    }

    #[test]
    fn bad_requests_are_answered() {
        let mut h = Harness::new(1);
        let mut msg = vec![];
        OfpHeader::new(OfpType::FeaturesRequest, 1).serialize(&mut msg).unwrap();

        let mut bad_version = msg.clone();
        bad_version[0] = 0x02;
        h.dp.forward_control_input(&mut h.queue, &bad_version);
        let mut bad_type = msg.clone();
        bad_type[1] = 30;
        h.dp.forward_control_input(&mut h.queue, &bad_type);
        let mut reply_type = msg.clone();
        reply_type[1] = OfpType::PacketIn as u8;
        h.dp.forward_control_input(&mut h.queue, &reply_type);
        let mut too_long = msg.clone();
        too_long[3] = 20;
        h.dp.forward_control_input(&mut h.queue, &too_long);

        let codes: Vec<(u16, u16)> = h.errors().into_iter().map(|(_, e)| (e.typ, e.code)).collect();
        let bad_request = OfpErrorType::BadRequest as u16;
        assert_eq!(
            vec![
                (bad_request, OfpBadRequestCode::BadVersion as u16),
                (bad_request, OfpBadRequestCode::BadType as u16),
                (bad_request, OfpBadRequestCode::BadType as u16),
                (bad_request, OfpBadRequestCode::BadLen as u16),
            ],
            codes
        );
        assert!(h.messages(OfpType::FeaturesReply).is_empty());
    }

    #[test]
    fn unknown_commands_are_answered() {
        let mut h = Harness::new(1);
        let mut flow_mod = OfpFlowMod::new(OfpFlowModCommand::Add, MatchKey::all(), 0, vec![]);
        flow_mod.command = 9;
        h.control(&flow_mod);
        h.control(&OfpVportMod {
            command: 7,
            vport: OFPP_VP_START,
            parent_port: 0,
            actions: vec![],
        });

        let codes: Vec<(u16, u16)> = h.errors().into_iter().map(|(_, e)| (e.typ, e.code)).collect();
        assert_eq!(
            vec![
                (
                    OfpErrorType::FlowModFailed as u16,
                    OfpFlowModFailedCode::BadCommand as u16
                ),
                (
                    OfpErrorType::VportModFailed as u16,
                    OfpVportModFailedCode::BadCommand as u16
                ),
            ],
            codes
        );
    }

    #[test]
    fn one_shot_requests() {
        let mut h = Harness::new(2);
        let mut hello = vec![];
        OfpHeader::new(OfpType::Hello, 5).serialize(&mut hello).unwrap();
        h.dp.forward_control_input(&mut h.queue, &hello);
        assert_eq!(vec![(5, vec![])], h.messages(OfpType::Hello));

        h.control(&OfpEchoRequest::new(b"ping".to_vec()));
        assert_eq!(vec![(XID, b"ping".to_vec())], h.messages(OfpType::EchoReply));

        let mut request = vec![];
        OfpHeader::new(OfpType::FeaturesRequest, XID).serialize(&mut request).unwrap();
        h.dp.forward_control_input(&mut h.queue, &request);
        let features = OfpSwitchFeatures::deserialize(&h.messages(OfpType::FeaturesReply)[0].1).unwrap();
        assert_eq!(7, features.datapath_id);
        assert_eq!(256, features.n_buffers);
        assert_eq!(2, features.n_tables);
        assert_eq!(OFP_SUPPORTED_CAPABILITIES, features.capabilities);
        assert_eq!(
            vec!["eth0", "eth1"],
            features.ports.iter().map(|p| p.name.as_str()).collect::<Vec<_>>()
        );
        assert_eq!(Some(MacAddr([0, 0, 0, 0, 1, 0])), h.dp.address());

        let mut request = vec![];
        OfpHeader::new(OfpType::VportTableFeaturesRequest, XID)
            .serialize(&mut request)
            .unwrap();
        h.dp.forward_control_input(&mut h.queue, &request);
        let features = OfpVportTableFeatures::deserialize(
            &h.messages(OfpType::VportTableFeaturesReply)[0].1,
        )
        .unwrap();
        assert_eq!(MAX_CHAIN_DEPTH as u16, features.max_chain_depth);
        assert!(h.errors().is_empty());
    }

    #[test]
    fn set_config_forces_fragment_drop() {
        let mut h = Harness::new(2);
        h.control(&OfpSetConfig {
            flags: OFPC_FRAG_REASM | OFPC_SEND_FLOW_EXP | 0x100,
            miss_send_len: 64,
        });
        assert_eq!(OFPC_FRAG_DROP | OFPC_SEND_FLOW_EXP, h.dp.flags());
        assert_eq!(64, h.dp.miss_send_len());

        let mut request = vec![];
        OfpHeader::new(OfpType::GetConfigRequest, XID).serialize(&mut request).unwrap();
        h.dp.forward_control_input(&mut h.queue, &request);
        let reply = OfpGetConfigReply::deserialize(&h.messages(OfpType::GetConfigReply)[0].1).unwrap();
        assert_eq!(OFPC_FRAG_DROP | OFPC_SEND_FLOW_EXP, reply.flags);
        assert_eq!(64, reply.miss_send_len);

        let mut fragment = frame(MAC_B, MAC_A, 10);
        // more fragments flag
        fragment[20] |= 0x20;
        h.receive(0, fragment);
        assert!(h.packet_ins().is_empty());
        assert_eq!(1, h.dp.ports().get(0).unwrap().rx_packets);

        h.receive(0, frame(MAC_B, MAC_A, 100));
        assert_eq!(64, h.packet_ins()[0].data.len());
    }

    #[test]
    fn mpls_ttl_one_is_dropped() {
        let mut h = Harness::new(2);
        let mut packet = Packet::parse(frame(MAC_B, MAC_A, 10)).unwrap();
        packet.push_mpls(100, 0, 1);
        h.receive(0, packet.into_data());

        assert!(h.packet_ins().is_empty());
        assert_eq!(1, h.dp.ports().get(0).unwrap().mpls_ttl0_dropped);
    }

    #[test]
    fn port_config_blocks_receive_and_packet_in() {
        let mut h = Harness::new(2);
        h.control(&OfpPortMod {
            port_no: 0,
            hw_addr: MacAddr([0, 0, 0, 0, 1, 0]),
            config: OFPPC_NO_RECV,
            mask: OFPPC_NO_RECV,
            advertise: 0,
        });
        h.control(&OfpPortMod {
            port_no: 1,
            hw_addr: MacAddr([0, 0, 0, 0, 1, 1]),
            config: OFPPC_NO_PACKET_IN,
            mask: OFPPC_NO_PACKET_IN,
            advertise: 0,
        });
        h.receive(0, frame(MAC_B, MAC_A, 10));
        h.receive(1, frame(MAC_B, MAC_A, 10));
        assert!(h.packet_ins().is_empty());

        // spanning tree frames are only blocked by NO_RECV_STP
        h.receive(0, frame(STP_ETH_ADDR, MAC_A, 10));
        assert_eq!(1, h.packet_ins().len());
        assert!(h.errors().is_empty());
    }

    #[test]
    fn flood_skips_ingress_and_no_flood_ports() {
        let mut h = Harness::new(4);
        h.control(&OfpPortMod {
            port_no: 2,
            hw_addr: MacAddr([0, 0, 0, 0, 1, 2]),
            config: OFPPC_NO_FLOOD,
            mask: OFPPC_NO_FLOOD,
            advertise: 0,
        });
        h.control(&OfpFlowMod::new(
            OfpFlowModCommand::Add,
            to_dst(MacAddr::BROADCAST),
            OFP_DEFAULT_PRIORITY,
            vec![output(OFPP_FLOOD)],
        ));
        h.control(&OfpFlowMod::new(
            OfpFlowModCommand::Add,
            to_dst(MAC_C),
            OFP_DEFAULT_PRIORITY,
            vec![output(OFPP_ALL)],
        ));
        h.receive(0, frame(MacAddr::BROADCAST, MAC_A, 10));
        assert_eq!(
            vec![0, 1, 0, 1],
            (0..4).map(|i| h.sent(i).len()).collect::<Vec<_>>()
        );
        h.receive(0, frame(MAC_C, MAC_A, 10));
        assert_eq!(
            vec![0, 2, 1, 2],
            (0..4).map(|i| h.sent(i).len()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn packet_out_to_in_port_and_controller() {
        let mut h = Harness::new(2);
        let f = frame(MAC_B, MAC_A, 100);
        h.control(&OfpPacketOut {
            buffer_id: OFP_NO_BUFFER,
            in_port: 1,
            actions: vec![
                output(OFPP_IN_PORT),
                Action::Output {
                    port: OFPP_CONTROLLER,
                    max_len: 20,
                },
            ],
            data: f.clone(),
        });
        assert_eq!(vec![f.clone()], h.sent(1));
        let packet_ins = h.packet_ins();
        assert_eq!(1, packet_ins.len());
        assert_eq!(OfpPacketInReason::Action as u8, packet_ins[0].reason);
        assert_eq!(&f[..20], &packet_ins[0].data[..]);
    }

    #[test]
    fn packet_out_through_table() {
        let mut h = Harness::new(2);
        h.control(&OfpFlowMod::new(
            OfpFlowModCommand::Add,
            to_dst(MAC_B),
            OFP_DEFAULT_PRIORITY,
            vec![output(1)],
        ));
        let packet_out = |dst| OfpPacketOut {
            buffer_id: OFP_NO_BUFFER,
            in_port: 0,
            actions: vec![output(OFPP_TABLE)],
            data: frame(dst, MAC_A, 10),
        };
        h.control(&packet_out(MAC_B));
        h.control(&packet_out(MAC_C));
        assert_eq!(1, h.sent(1).len());
        // a miss during reclassification is not reported
        assert!(h.packet_ins().is_empty());
    }

    #[test]
    fn vport_chain_runs_every_hop() {
        let mut h = Harness::new(2);
        let vp1 = OFPP_VP_START;
        let vp2 = OFPP_VP_START + 1;
        h.control(&OfpVportMod {
            command: OfpVportModCommand::Add as u16,
            vport: vp1,
            parent_port: 1,
            actions: vec![VPortAction::SetMplsExp(5)],
        });
        h.control(&OfpVportMod {
            command: OfpVportModCommand::Add as u16,
            vport: vp2,
            parent_port: vp1,
            actions: vec![VPortAction::PushMpls {
                label: 77,
                exp: 0,
                ttl: 0,
            }],
        });
        h.control(&OfpFlowMod::new(
            OfpFlowModCommand::Add,
            to_dst(MAC_B),
            OFP_DEFAULT_PRIORITY,
            vec![output(vp2)],
        ));
        h.receive(0, frame(MAC_B, MAC_A, 10));

        let sent = h.sent(1);
        assert_eq!(1, sent.len());
        let packet = Packet::parse(sent[0].clone()).unwrap();
        assert_eq!(ETH_TYPE_MPLS, packet.outer_type());
        let shim = packet.mpls_shim().unwrap();
        assert_eq!(77, shim >> 12);
        assert_eq!(5, (shim >> 9) & 0x7);
        let stats = h.dp.vports().stats();
        assert_eq!(1, stats.port_match_count);
        assert_eq!(1, stats.chain_match_count);
        assert!(h.errors().is_empty());
    }

    #[test]
    fn vport_cycle_is_dropped() {
        let mut h = Harness::new(2);
        let vp1 = OFPP_VP_START;
        let vp2 = OFPP_VP_START + 1;
        for &(vport, parent) in &[(vp1, vp2), (vp2, vp1)] {
            h.control(&OfpVportMod {
                command: OfpVportModCommand::Add as u16,
                vport: vport,
                parent_port: parent,
                actions: vec![],
            });
        }
        h.control(&OfpFlowMod::new(
            OfpFlowModCommand::Add,
            MatchKey::all(),
            OFP_DEFAULT_PRIORITY,
            vec![output(vp1)],
        ));
        h.receive(0, frame(MAC_B, MAC_A, 10));

        assert!(h.sent(0).is_empty());
        assert!(h.sent(1).is_empty());
        assert_eq!(MAX_CHAIN_DEPTH as u64, h.dp.vports().stats().lookup_count);
    }

    #[test]
    fn ericsson_push_mpls_action() {
        let mut h = Harness::new(2);
        h.control(&OfpFlowMod::new(
            OfpFlowModCommand::Add,
            to_dst(MAC_B),
            OFP_DEFAULT_PRIORITY,
            vec![
                Action::Vendor(VendorAction::Ericsson(ErAction::PushMpls {
                    label: 9,
                    exp: 0,
                    ttl: 64,
                })),
                output(1),
            ],
        ));
        h.receive(0, frame(MAC_B, MAC_A, 10));
        let packet = Packet::parse(h.sent(1)[0].clone()).unwrap();
        assert_eq!(Some(64), packet.mpls_ttl());
    }

    #[test]
    fn flow_stats_are_chunked() {
        let mut h = Harness::new(2);
        for i in 0..60u16 {
            let key = FlowKey {
                tp_dst: i,
                ..FlowKey::default()
            };
            h.control(&OfpFlowMod::new(
                OfpFlowModCommand::Add,
                MatchKey::exact(key),
                0,
                vec![output(1)],
            ));
        }
        let mut body = vec![];
        OfpFlowStatsRequest {
            match_key: MatchKey::all(),
            table_id: OFPTT_ALL,
            out_port: OFPP_NONE,
        }
        .serialize(&mut body)
        .unwrap();
        h.control(&OfpStatsRequest {
            typ: OfpStatsType::Flow as u16,
            flags: 0,
            body: body,
        });

        let replies: Vec<OfpStatsReply> = h
            .messages(OfpType::StatsReply)
            .into_iter()
            .map(|(_, body)| OfpStatsReply::deserialize(&body).unwrap())
            .collect();
        assert_eq!(2, replies.len());
        assert_eq!(OFPSF_REPLY_MORE, replies[0].flags);
        assert_eq!(0, replies[1].flags);
        assert!(replies.iter().all(|reply| reply.body.len() <= MAX_REPLY_BODY));
        let n: usize = replies
            .iter()
            .map(|reply| deserialize_flow_stats(&reply.body).unwrap().len())
            .sum();
        assert_eq!(60, n);
    }

    #[test]
    fn frames_to_the_switch_stay_local() {
        let mut h = Harness::new(2);
        let address = h.dp.address().unwrap();
        h.dp.receive_from_device(
            &mut h.queue,
            1,
            frame(address, MAC_A, 10),
            PacketType::Host,
        );
        assert!(h.queue.is_empty());
        assert_eq!(1, h.dp.local_packets());
        assert_eq!(1, h.dp.ports().get(1).unwrap().rx_packets);
    }

    #[test]
    fn port_status_follows_the_ports() {
        let mut h = Harness::new(2);
        assert_eq!(2, h.messages(OfpType::PortStatus).len());

        *h.devices[1].link_up.borrow_mut() = false;
        h.queue.advance_to(Duration::from_secs(2));
        h.receive(0, frame(MAC_B, MAC_A, 10));
        let status = h.messages(OfpType::PortStatus);
        assert_eq!(3, status.len());
        let modified = OfpPortStatus::deserialize(&status[2].1).unwrap();
        assert_eq!(OfpPortReason::Modify as u8, modified.reason);
        assert_eq!(1, modified.desc.port_no);
        assert_eq!(OFPPS_LINK_DOWN, modified.desc.state);

        h.dp.shutdown();
        let deleted: Vec<u8> = h.messages(OfpType::PortStatus)[3..]
            .iter()
            .map(|&(_, ref body)| OfpPortStatus::deserialize(body).unwrap().reason)
            .collect();
        assert_eq!(vec![OfpPortReason::Delete as u8; 2], deleted);
    }

    #[test]
    fn second_controller_is_refused() {
        let mut h = Harness::new(0);
        let log = Rc::new(RefCell::new(vec![]));
        assert!(!h.dp.set_controller(Box::new(RecordingController { log: log })));
    }
}
