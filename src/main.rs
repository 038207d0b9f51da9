/*!
Simulates a star of hosts around one OpenFlow switch.

Every host sits on its own switch port and sends UDP datagrams to its
neighbor, resolving the neighbor's address with ARP first. The switch asks
the configured controller about every frame it has no flow for.

```sh
$ ofswitch -vvv -c switch.ini -d 30
```
*/

#[macro_use]
extern crate clap;
#[macro_use]
extern crate log;
extern crate ofswitch;
extern crate simple_logger;

#[cfg(unix)]
extern crate log_panics;
#[cfg(unix)]
extern crate syslog;

use ofswitch::conf::{self, Setup};
use ofswitch::datapath::{DatapathEvent, PacketType, SwitchDatapath};
use ofswitch::packet::*;
use ofswitch::port::NetDevice;
use ofswitch::sim::EventQueue;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io;
use std::mem;
use std::net::Ipv4Addr;
use std::process::exit;
use std::rc::Rc;
use std::time::Duration;

const DEFAULT_DURATION_SECS: u64 = 10;
const LINK_DELAY: Duration = Duration::from_micros(2);
const SEND_INTERVAL: Duration = Duration::from_millis(100);
const DISCARD_PORT: u16 = 9;
const LINK_MTU: u16 = 1500;

enum Event {
    Datapath(DatapathEvent),
    ToSwitch { port_no: u32, frame: Vec<u8> },
    ToHost { host: usize, frame: Vec<u8> },
    /// A host sends its next datagram
    Send { host: usize, remaining: usize },
}

impl From<DatapathEvent> for Event {
    fn from(event: DatapathEvent) -> Self {
        Event::Datapath(event)
    }
}

/// The switch side of a host's link. Sent frames wait on the wire until the
/// simulation loop delivers them.
struct Link {
    host: usize,
    addr: MacAddr,
    wire: Rc<RefCell<Vec<(usize, Vec<u8>)>>>,
}

impl NetDevice for Link {
    fn send(&mut self, frame: Vec<u8>, _: MacAddr, _: MacAddr, _: u16) -> bool {
        self.wire.borrow_mut().push((self.host, frame));
        true
    }

    fn is_link_up(&self) -> bool {
        true
    }

    fn address(&self) -> MacAddr {
        self.addr
    }

    fn mtu(&self) -> u16 {
        LINK_MTU
    }
}

struct Host {
    mac: MacAddr,
    ip: Ipv4Addr,
    arp: BTreeMap<Ipv4Addr, MacAddr>,
    /// Destinations of datagrams waiting for an ARP reply
    waiting: Vec<Ipv4Addr>,
    sent: usize,
    received: usize,
}

impl Host {
    fn new(idx: usize, ip: Ipv4Addr) -> Host {
        Host {
            mac: MacAddr([0x02, 0, 0, 0, (idx >> 8) as u8, idx as u8]),
            ip: ip,
            arp: BTreeMap::new(),
            waiting: vec![],
            sent: 0,
            received: 0,
        }
    }

    fn datagram(&self, mac: MacAddr, dst: Ipv4Addr) -> Vec<u8> {
        encode_udp_frame(
            mac,
            self.mac,
            self.ip,
            dst,
            DISCARD_PORT,
            DISCARD_PORT,
            &self.sent.to_be_bytes(),
        )
    }

    fn send_to(&mut self, dst: Ipv4Addr) -> Vec<u8> {
        self.sent += 1;
        match self.arp.get(&dst) {
            Some(&mac) => self.datagram(mac, dst),
            None => {
                debug!("{} resolves {}", self.ip, dst);
                self.waiting.push(dst);
                let request = encode_arp(ARP_OP_REQUEST, self.mac, self.ip, MacAddr::default(), dst);
                encode_ethernet(MacAddr::BROADCAST, self.mac, ETH_TYPE_ARP, &request)
            }
        }
    }

    /// Handles a frame from the link and returns the frames to send back
    fn receive(&mut self, frame: Vec<u8>) -> Vec<Vec<u8>> {
        let packet = match Packet::parse(frame) {
            Some(packet) => packet,
            None => return vec![],
        };
        if let Some((op, spa, tpa)) = packet.arp() {
            let spa = Ipv4Addr::from(spa);
            self.arp.insert(spa, packet.eth_src());
            let mut out = vec![];
            if op == ARP_OP_REQUEST && Ipv4Addr::from(tpa) == self.ip {
                let reply = encode_arp(ARP_OP_REPLY, self.mac, self.ip, packet.eth_src(), spa);
                out.push(encode_ethernet(packet.eth_src(), self.mac, ETH_TYPE_ARP, &reply));
            }
            let waiting = mem::replace(&mut self.waiting, vec![]);
            let (resolved, waiting): (Vec<Ipv4Addr>, Vec<Ipv4Addr>) = {
                let arp = &self.arp;
                waiting.into_iter().partition(|dst| arp.contains_key(dst))
            };
            self.waiting = waiting;
            for dst in resolved {
                if let Some(&mac) = self.arp.get(&dst) {
                    out.push(self.datagram(mac, dst));
                }
            }
            return out;
        }
        if packet.eth_dst() == self.mac
            && packet.ipv4_dst() == Some(u32::from(self.ip))
            && packet.ip_proto() == Some(IP_PROTO_UDP)
        {
            self.received += 1;
        }
        vec![]
    }
}

fn packet_type(frame: &[u8], port_addr: Option<MacAddr>) -> PacketType {
    if frame.len() < ETH_ADDR_LEN {
        return PacketType::OtherHost;
    }
    let dst = MacAddr::from_slice(frame);
    if dst.is_broadcast() {
        PacketType::Broadcast
    }
    else if dst.is_multicast() {
        PacketType::Multicast
    }
    else if Some(dst) == port_addr {
        PacketType::Host
    }
    else {
        PacketType::OtherHost
    }
}

/// Datagrams every host sent and received
struct Report {
    hosts: Vec<(Ipv4Addr, usize, usize)>,
    flows: usize,
}

fn simulate(setup: &Setup, duration: Duration) -> io::Result<Report> {
    let wire = Rc::new(RefCell::new(vec![]));
    let mut switch = SwitchDatapath::new(setup.switch.clone());
    if let Some(controller) = setup.topology.build_controller() {
        switch.set_controller(controller);
    }

    let mut hosts = vec![];
    for idx in 0..setup.topology.hosts {
        let ip = setup
            .host_addr(idx)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "too many hosts"))?;
        hosts.push(Host::new(idx, ip));
        let link = Link {
            host: idx,
            addr: MacAddr([0x02, 0xff, 0, 0, (idx >> 8) as u8, idx as u8]),
            wire: wire.clone(),
        };
        switch
            .attach_port(Box::new(link))
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    }

    let mut queue = EventQueue::new();
    if hosts.len() > 1 && setup.topology.frames > 0 {
        for host in 0..hosts.len() {
            queue.schedule_at(
                Duration::from_millis(host as u64),
                Event::Send {
                    host: host,
                    remaining: setup.topology.frames,
                },
            );
        }
    }

    while let Some((at, event)) = queue.pop() {
        if at > duration {
            break;
        }
        match event {
            Event::Datapath(event) => switch.handle_event(&mut queue, event),
            Event::ToSwitch { port_no, frame } => {
                let port_addr = switch.ports().get(port_no).map(|port| port.address());
                let typ = packet_type(&frame, port_addr);
                switch.receive_from_device(&mut queue, port_no, frame, typ);
            }
            Event::ToHost { host, frame } => {
                for reply in hosts[host].receive(frame) {
                    queue.schedule_at(
                        at + LINK_DELAY,
                        Event::ToSwitch {
                            port_no: host as u32,
                            frame: reply,
                        },
                    );
                }
            }
            Event::Send { host, remaining } => {
                let dst = hosts[(host + 1) % hosts.len()].ip;
                let frame = hosts[host].send_to(dst);
                queue.schedule_at(
                    at + LINK_DELAY,
                    Event::ToSwitch {
                        port_no: host as u32,
                        frame: frame,
                    },
                );
                if remaining > 1 {
                    queue.schedule_at(
                        at + SEND_INTERVAL,
                        Event::Send {
                            host: host,
                            remaining: remaining - 1,
                        },
                    );
                }
            }
        }
        let delivered: Vec<(usize, Vec<u8>)> = wire.borrow_mut().drain(..).collect();
        for (host, frame) in delivered {
            queue.schedule_at(at + LINK_DELAY, Event::ToHost { host: host, frame: frame });
        }
    }

    let report = Report {
        hosts: hosts.iter().map(|h| (h.ip, h.sent, h.received)).collect(),
        flows: switch.flow_chain().n_flows(),
    };
    for port in switch.ports().iter() {
        info!(
            "Port {}: rx {} packets, tx {} packets, {} dropped",
            port.port_no, port.rx_packets, port.tx_packets, port.tx_dropped
        );
    }
    switch.shutdown();
    Ok(report)
}

#[cfg(unix)]
fn init_syslog(level: log::Level) -> io::Result<()> {
    syslog::init(syslog::Facility::LOG_USER, level.to_level_filter(), Some(crate_name!()))
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    log_panics::init();
    Ok(())
}

#[cfg(not(unix))]
fn init_syslog(_: log::Level) -> io::Result<()> {
    Err(io::Error::new(io::ErrorKind::Other, "syslog is only available on Unix"))
}

/// Reads command line arguments and calls the corresponding functions.
fn handle_cli_args() -> io::Result<()> {
    #[cfg(unix)]
    let unix_opts = "-s, --syslog           'Logs via syslog'
        ";
    #[cfg(not(unix))]
    let unix_opts = "";

    let usage = &format!(
        "{}-v...                  'Repeat to set the level of verbosity'
        -c, --conf [ini]       'The INI configuration file'
        -d, --duration [secs]  'Simulated seconds to run'",
        unix_opts
    );
    let matches = app_from_crate!().args_from_usage(usage).get_matches();

    let log_lvl = match matches.occurrences_of("v") {
        0 => log::Level::Error,
        1 => log::Level::Warn,
        2 => log::Level::Info,
        3 => log::Level::Debug,
        _ => log::Level::Trace,
    };
    if matches.is_present("syslog") {
        init_syslog(log_lvl)?;
    }
    else {
        simple_logger::init_with_level(log_lvl)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    }

    let duration = if matches.is_present("duration") {
        value_t!(matches, "duration", u64).unwrap_or_else(|e| e.exit())
    }
    else {
        DEFAULT_DURATION_SECS
    };
    let setup = match matches.value_of("conf") {
        Some(path) => conf::parse_file(path)?,
        None => conf::defaults()?,
    };

    let report = simulate(&setup, Duration::from_secs(duration))?;
    for &(ip, sent, received) in &report.hosts {
        println!("{}: sent {}, received {}", ip, sent, received);
    }
    println!("{} flows installed at the end", report.flows);
    Ok(())
}

/// Entry function with top level error handling.
fn main() {
    if let Err(e) = handle_cli_args() {
        error!("{}", e);
        exit(1);
    }
}
