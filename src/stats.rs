/*!
Statistics dumps

A Stats-Request starts a dump that is bound to the request type. The
datapath calls `dump` until it reports that nothing more follows, sending
one Stats-Reply per call, and finishes with `cleanup`. Flow and port dumps
remember where they stopped, so each reply body stays below
`MAX_REPLY_BODY` bytes.
*/

use byteorder::{ByteOrder, NetworkEndian};
use flow_table::{FlowChain, FlowTable};
use openflow::error::{Error, Result};
use openflow::messages::deserialize::Deserialize;
use openflow::messages::*;
use port::PortManager;
use sim::SimTime;
use vport::VPortTable;

/// Largest body a single reply of a chunked dump carries
pub const MAX_REPLY_BODY: usize = 4096;

/// The datapath state a dump reads
pub struct DumpContext<'a> {
    pub chain: &'a FlowChain,
    pub ports: &'a PortManager,
    pub vports: &'a VPortTable,
    pub desc: &'a OfpDescStats,
    pub now: SimTime,
}

#[derive(Debug, PartialEq)]
pub enum StatsDump {
    Desc,
    Flow {
        request: OfpFlowStatsRequest,
        table_idx: usize,
        position: usize,
    },
    Aggregate(OfpFlowStatsRequest),
    Table,
    Port { ports: Vec<u32>, position: usize },
    PortTable,
    Vendor,
}

impl StatsDump {
    /// Parses the request body for its type
    pub fn init(request: &OfpStatsRequest) -> Result<StatsDump> {
        let typ = OfpStatsType::from_u16(request.typ)
            .ok_or(Error::BadRequest(OfpBadRequestCode::BadStat))?;
        Ok(match typ {
            OfpStatsType::Desc => StatsDump::Desc,
            OfpStatsType::Flow => StatsDump::Flow {
                request: OfpFlowStatsRequest::deserialize(&request.body)?,
                table_idx: 0,
                position: 0,
            },
            OfpStatsType::Aggregate => {
                StatsDump::Aggregate(OfpFlowStatsRequest::deserialize(&request.body)?)
            }
            OfpStatsType::Table => StatsDump::Table,
            OfpStatsType::Port => StatsDump::Port {
                ports: parse_port_list(&request.body)?,
                position: 0,
            },
            OfpStatsType::PortTable => StatsDump::PortTable,
            OfpStatsType::Vendor => StatsDump::Vendor,
        })
    }

    pub fn typ(&self) -> OfpStatsType {
        match *self {
            StatsDump::Desc => OfpStatsType::Desc,
            StatsDump::Flow { .. } => OfpStatsType::Flow,
            StatsDump::Aggregate(_) => OfpStatsType::Aggregate,
            StatsDump::Table => OfpStatsType::Table,
            StatsDump::Port { .. } => OfpStatsType::Port,
            StatsDump::PortTable => OfpStatsType::PortTable,
            StatsDump::Vendor => OfpStatsType::Vendor,
        }
    }

    /// Appends the next chunk to `body`. Returns whether more chunks follow.
    pub fn dump(&mut self, ctx: &DumpContext, body: &mut Vec<u8>) -> Result<bool> {
        match *self {
            StatsDump::Desc => {
                ctx.desc.serialize(body)?;
                Ok(false)
            }
            StatsDump::Flow {
                ref request,
                ref mut table_idx,
                ref mut position,
            } => dump_flows(ctx, request, table_idx, position, body),
            StatsDump::Aggregate(ref request) => {
                let mut aggregate = OfpAggregateStats::default();
                ctx.chain.for_each_matching(
                    &request.match_key,
                    request.out_port,
                    request.table_id,
                    |_, flow| {
                        aggregate.packet_count += flow.packet_count;
                        aggregate.byte_count += flow.byte_count;
                        aggregate.flow_count += 1;
                    },
                );
                aggregate.serialize(body)?;
                Ok(false)
            }
            StatsDump::Table => {
                for table in ctx.chain.table_stats() {
                    table.serialize(body)?;
                }
                Ok(false)
            }
            StatsDump::Port {
                ref ports,
                ref mut position,
            } => dump_ports(ctx, ports, position, body),
            StatsDump::PortTable => {
                ctx.vports.stats().serialize(body)?;
                Ok(false)
            }
            StatsDump::Vendor => Ok(false),
        }
    }

    pub fn cleanup(self) {
        trace!("Finished {:?} statistics dump", self.typ());
    }
}

/// The port numbers a port statistics request asks for.
/// OFPP_NONE stands for every attached port.
fn parse_port_list(body: &[u8]) -> Result<Vec<u32>> {
    if body.len() % 4 != 0 {
        return Err(Error::BadRequest(OfpBadRequestCode::BadLen));
    }
    Ok(body.chunks(4).map(NetworkEndian::read_u32).collect())
}

fn dump_flows(
    ctx: &DumpContext,
    request: &OfpFlowStatsRequest,
    table_idx: &mut usize,
    position: &mut usize,
    body: &mut Vec<u8>,
) -> Result<bool> {
    while *table_idx < ctx.chain.n_tables() {
        if request.table_id == OFPTT_ALL || usize::from(request.table_id) == *table_idx {
            if let Some(table) = ctx.chain.table(*table_idx) {
                let matching = table
                    .iter()
                    .filter(|flow| {
                        request.match_key.matches(&flow.key.flow) && flow.has_output_to(request.out_port)
                    })
                    .skip(*position);
                for flow in matching {
                    let stats = flow.to_flow_stats(*table_idx as u8, ctx.now);
                    if !body.is_empty() && body.len() + stats.length() > MAX_REPLY_BODY {
                        return Ok(true);
                    }
                    stats.serialize(body)?;
                    *position += 1;
                }
            }
        }
        *table_idx += 1;
        *position = 0;
    }
    Ok(false)
}

fn dump_ports(ctx: &DumpContext, ports: &[u32], position: &mut usize, body: &mut Vec<u8>) -> Result<bool> {
    let all: Vec<u32>;
    let ports = if ports.contains(&OFPP_NONE) {
        all = ctx.ports.iter().map(|port| port.port_no).collect();
        &all[..]
    }
    else {
        ports
    };

    while *position < ports.len() {
        if !body.is_empty() && body.len() + OfpPortStats::length() > MAX_REPLY_BODY {
            return Ok(true);
        }
        let port_no = ports[*position];
        *position += 1;
        let stats = if is_vport(port_no) {
            ctx.vports.lookup(port_no).map(|vport| OfpPortStats {
                tx_packets: vport.packet_count,
                tx_bytes: vport.byte_count,
                ..OfpPortStats::unknown(port_no)
            })
        }
        else {
            ctx.ports.get(port_no).map(|port| port.stats())
        };
        match stats {
            Some(stats) => stats.serialize(body)?,
            None => debug!("No statistics for unknown port {:#x}", port_no),
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow::{FlowKey, MatchKey};
    use flow_table::FlowEntry;
    use action::Action;
    use port::tests::RecordingDevice;
    use openflow::messages::deserialize::deserialize_flow_stats;

    use std::time::Duration;

    fn desc() -> OfpDescStats {
        OfpDescStats {
            mfr_desc: "mfr".to_owned(),
            hw_desc: "hw".to_owned(),
            sw_desc: "sw".to_owned(),
            serial_num: "1".to_owned(),
        }
    }

    fn flow_request(table_id: u8, out_port: u32) -> OfpStatsRequest {
        let mut body = vec![];
        OfpFlowStatsRequest {
            match_key: MatchKey::all(),
            table_id: table_id,
            out_port: out_port,
        }
        .serialize(&mut body)
        .unwrap();
        OfpStatsRequest {
            typ: OfpStatsType::Flow as u16,
            flags: 0,
            body: body,
        }
    }

    fn chain_with_flows(n: u16) -> FlowChain {
        let mut chain = FlowChain::new(100, 100);
        for i in 0..n {
            let flow = FlowKey {
                tp_dst: i,
                ..FlowKey::default()
            };
            let flow_mod = OfpFlowMod::new(
                OfpFlowModCommand::Add,
                MatchKey::exact(flow),
                0,
                vec![Action::Output { port: 1, max_len: 0 }],
            );
            chain.insert(FlowEntry::from_flow_mod(&flow_mod, Duration::from_secs(0))).unwrap();
        }
        chain
    }

    /// Runs a dump to completion and returns every reply body
    fn run(dump: &mut StatsDump, ctx: &DumpContext) -> Vec<Vec<u8>> {
        let mut bodies = vec![];
        loop {
            let mut body = vec![];
            let more = dump.dump(ctx, &mut body).unwrap();
            bodies.push(body);
            if !more {
                return bodies;
            }
        }
    }

    #[test]
    fn unknown_type() {
        let request = OfpStatsRequest {
            typ: 42,
            flags: 0,
            body: vec![],
        };
        match StatsDump::init(&request) {
            Err(Error::BadRequest(OfpBadRequestCode::BadStat)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn flow_dump_is_chunked() {
        // 104 bytes per entry, 39 fit into one body
        let chain = chain_with_flows(50);
        let ports = PortManager::new(1);
        let vports = VPortTable::new(1);
        let desc = desc();
        let ctx = DumpContext {
            chain: &chain,
            ports: &ports,
            vports: &vports,
            desc: &desc,
            now: Duration::from_secs(3),
        };
        let mut dump = StatsDump::init(&flow_request(OFPTT_ALL, OFPP_NONE)).unwrap();
        let bodies = run(&mut dump, &ctx);

        assert_eq!(2, bodies.len());
        assert!(bodies.iter().all(|body| body.len() <= MAX_REPLY_BODY));
        let first = deserialize_flow_stats(&bodies[0]).unwrap();
        let second = deserialize_flow_stats(&bodies[1]).unwrap();
        assert_eq!(39, first.len());
        assert_eq!(11, second.len());
        assert_eq!(3, first[0].duration_sec);
        let mut tp_dsts: Vec<u16> = first
            .iter()
            .chain(second.iter())
            .map(|stats| stats.match_key.flow.tp_dst)
            .collect();
        tp_dsts.sort();
        assert_eq!((0..50).collect::<Vec<u16>>(), tp_dsts);
    }

    #[test]
    fn flow_dump_filters_table_and_port() {
        let chain = chain_with_flows(3);
        let ports = PortManager::new(1);
        let vports = VPortTable::new(1);
        let desc = desc();
        let ctx = DumpContext {
            chain: &chain,
            ports: &ports,
            vports: &vports,
            desc: &desc,
            now: Duration::from_secs(0),
        };
        let mut dump = StatsDump::init(&flow_request(1, OFPP_NONE)).unwrap();
        assert_eq!(vec![Vec::<u8>::new()], run(&mut dump, &ctx));
        let mut dump = StatsDump::init(&flow_request(OFPTT_ALL, 2)).unwrap();
        assert_eq!(vec![Vec::<u8>::new()], run(&mut dump, &ctx));
        let mut dump = StatsDump::init(&flow_request(0, 1)).unwrap();
        assert_eq!(3, deserialize_flow_stats(&run(&mut dump, &ctx)[0]).unwrap().len());
    }

    #[test]
    fn aggregate_counts() {
        let mut chain = chain_with_flows(2);
        let key = FlowKey {
            tp_dst: 1,
            ..FlowKey::default()
        };
        chain.lookup(&key).unwrap().used(Duration::from_secs(1), 100);
        let ports = PortManager::new(1);
        let vports = VPortTable::new(1);
        let desc = desc();
        let ctx = DumpContext {
            chain: &chain,
            ports: &ports,
            vports: &vports,
            desc: &desc,
            now: Duration::from_secs(1),
        };
        let mut request = flow_request(OFPTT_ALL, OFPP_NONE);
        request.typ = OfpStatsType::Aggregate as u16;
        let mut dump = StatsDump::init(&request).unwrap();
        let bodies = run(&mut dump, &ctx);
        let aggregate = OfpAggregateStats::deserialize(&bodies[0]).unwrap();
        assert_eq!(1, aggregate.packet_count);
        assert_eq!(100, aggregate.byte_count);
        assert_eq!(2, aggregate.flow_count);
    }

    #[test]
    fn port_dump_reports_physical_and_virtual_ports() {
        let chain = FlowChain::new(1, 1);
        let mut ports = PortManager::new(2);
        ports.attach(Box::new(RecordingDevice::new(0))).unwrap();
        ports.attach(Box::new(RecordingDevice::new(1))).unwrap();
        let mut vports = VPortTable::new(2);
        vports.insert(OFPP_VP_START, 1, vec![]).unwrap();
        vports.hop(OFPP_VP_START, false, 60);
        let desc = desc();
        let ctx = DumpContext {
            chain: &chain,
            ports: &ports,
            vports: &vports,
            desc: &desc,
            now: Duration::from_secs(0),
        };

        let mut body = vec![];
        for port in &[1, OFPP_VP_START, 77] {
            body.extend_from_slice(&[0; 4]);
            let at = body.len() - 4;
            NetworkEndian::write_u32(&mut body[at..], *port);
        }
        let request = OfpStatsRequest {
            typ: OfpStatsType::Port as u16,
            flags: 0,
            body: body,
        };
        let mut dump = StatsDump::init(&request).unwrap();
        let bodies = run(&mut dump, &ctx);
        assert_eq!(2 * OfpPortStats::length(), bodies[0].len());
        let vport = OfpPortStats::deserialize(&bodies[0][OfpPortStats::length()..]).unwrap();
        assert_eq!(OFPP_VP_START, vport.port_no);
        assert_eq!(1, vport.tx_packets);
        assert_eq!(60, vport.tx_bytes);
        assert_eq!(u64::max_value(), vport.rx_packets);

        let request = OfpStatsRequest {
            typ: OfpStatsType::Port as u16,
            flags: 0,
            body: vec![0xff; 4],
        };
        let mut dump = StatsDump::init(&request).unwrap();
        assert_eq!(2 * OfpPortStats::length(), run(&mut dump, &ctx)[0].len());
    }

    #[test]
    fn odd_port_list_length() {
        let request = OfpStatsRequest {
            typ: OfpStatsType::Port as u16,
            flags: 0,
            body: vec![0; 6],
        };
        match StatsDump::init(&request) {
            Err(Error::BadRequest(OfpBadRequestCode::BadLen)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn single_shot_dumps() {
        let chain = FlowChain::new(1, 1);
        let ports = PortManager::new(1);
        let vports = VPortTable::new(7);
        let desc = desc();
        let ctx = DumpContext {
            chain: &chain,
            ports: &ports,
            vports: &vports,
            desc: &desc,
            now: Duration::from_secs(0),
        };
        let mut requests = vec![];
        for typ in &[OfpStatsType::Desc, OfpStatsType::Table, OfpStatsType::PortTable, OfpStatsType::Vendor] {
            requests.push(OfpStatsRequest {
                typ: *typ as u16,
                flags: 0,
                body: vec![],
            });
        }
        let lengths: Vec<usize> = requests
            .iter()
            .map(|request| {
                let mut dump = StatsDump::init(request).unwrap();
                let bodies = run(&mut dump, &ctx);
                assert_eq!(1, bodies.len());
                dump.cleanup();
                bodies[0].len()
            })
            .collect();
        assert_eq!(vec![800, 2 * 64, 32, 0], lengths);
    }
}
