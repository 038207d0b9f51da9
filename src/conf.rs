/*!
A parser for an INI file with the following structure:

```ini
[Switch]
; random when absent
datapath_id=0x0000000000000001
lookup_delay_ns=30
miss_send_len=128
flags=0

[Tables]
exact_max=65536
wildcard_max=100

[VPorts]
max=4096

[Topology]
hosts=3
; learning, drop or none
controller=learning
expiration_secs=0
frames=10

[Networks]
hosts=10.0.0.0/24
```

Every section and key is optional.
*/

use controller::{Controller, DropController, LearningController};
use datapath::{SwitchConfig, DEFAULT_LOOKUP_DELAY_NS};
use openflow::messages::{OFPC_FRAG_MASK, OFPC_SEND_FLOW_EXP};

use ini::ini;
use ini::Ini;

use ipnetwork::{IpNetworkError, Ipv4Network};

use rand;

use std::error;
use std::fmt;
use std::io;
use std::net::Ipv4Addr;
use std::num::ParseIntError;
use std::str::FromStr;
use std::time::Duration;

const SWITCH_SECTION: &str = "Switch";
const DATAPATH_ID_KEY: &str = "datapath_id";
const LOOKUP_DELAY_KEY: &str = "lookup_delay_ns";
const MISS_SEND_LEN_KEY: &str = "miss_send_len";
const FLAGS_KEY: &str = "flags";

const TABLES_SECTION: &str = "Tables";
const EXACT_MAX_KEY: &str = "exact_max";
const WILDCARD_MAX_KEY: &str = "wildcard_max";

const VPORTS_SECTION: &str = "VPorts";
const MAX_KEY: &str = "max";

const TOPOLOGY_SECTION: &str = "Topology";
const HOSTS_KEY: &str = "hosts";
const CONTROLLER_KEY: &str = "controller";
const EXPIRATION_KEY: &str = "expiration_secs";
const FRAMES_KEY: &str = "frames";

const NET_SECTION: &str = "Networks";

#[derive(Debug)]
pub enum Error {
    Ini(ini::Error),
    ParseInt(&'static str, &'static str, ParseIntError),
    InvalidValue(&'static str, &'static str, String),
    InvalidCidr(IpNetworkError, String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Ini(ref e) => write!(f, "{}", e),
            Error::ParseInt(s, k, ref e) => {
                write!(f, "Error on trying to parse '{}' in the [{}] section: {}", k, s, e)
            }
            Error::InvalidValue(s, k, ref v) => {
                write!(f, "The value '{}' of '{}' in the [{}] section is invalid", v, k, s)
            }
            Error::InvalidCidr(ref e, ref s) => {
                write!(f, "Error on trying to parse '{}' as IP CIDR: {}", s, e)
            }
        }
    }
}

impl From<Error> for io::Error {
    fn from(e: Error) -> Self {
        io::Error::new(io::ErrorKind::InvalidData, e)
    }
}

impl error::Error for Error {
    fn description(&self) -> &str {
        "INI configuration parser error"
    }
}

trait Section {
    type S;

    fn from_ini(conf: &Ini) -> Result<Self::S, Error>;
}

fn value<'a>(conf: &'a Ini, section: &'static str, key: &'static str) -> Option<&'a str> {
    conf.section(Some(section.to_owned()))
        .and_then(|properties| properties.get(key))
        .map(|v| v.as_str())
}

fn number<T>(conf: &Ini, section: &'static str, key: &'static str, default: T) -> Result<T, Error>
where
    T: FromStr<Err = ParseIntError>,
{
    match value(conf, section, key) {
        Some(v) => v.parse().map_err(|e| Error::ParseInt(section, key, e)),
        None => Ok(default),
    }
}

/// Parses a decimal or a 0x prefixed hexadecimal number
fn parse_u64(v: &str) -> Result<u64, ParseIntError> {
    if v.starts_with("0x") || v.starts_with("0X") {
        u64::from_str_radix(&v[2..], 16)
    }
    else {
        v.parse()
    }
}

impl Section for SwitchConfig {
    type S = SwitchConfig;

    fn from_ini(conf: &Ini) -> Result<Self::S, Error> {
        debug!(
            "Reading [{}], [{}] and [{}] sections",
            SWITCH_SECTION, TABLES_SECTION, VPORTS_SECTION
        );
        let defaults = SwitchConfig::default();

        let datapath_id = match value(conf, SWITCH_SECTION, DATAPATH_ID_KEY) {
            Some(v) => parse_u64(v).map_err(|e| Error::ParseInt(SWITCH_SECTION, DATAPATH_ID_KEY, e))?,
            None => rand::random(),
        };
        let flags = match value(conf, SWITCH_SECTION, FLAGS_KEY) {
            Some(v) => parse_u64(v).map_err(|e| Error::ParseInt(SWITCH_SECTION, FLAGS_KEY, e))?,
            None => u64::from(defaults.flags),
        };
        if flags & !u64::from(OFPC_SEND_FLOW_EXP | OFPC_FRAG_MASK) != 0 {
            return Err(Error::InvalidValue(SWITCH_SECTION, FLAGS_KEY, flags.to_string()));
        }
        let lookup_delay_ns = number(
            conf,
            SWITCH_SECTION,
            LOOKUP_DELAY_KEY,
            DEFAULT_LOOKUP_DELAY_NS,
        )?;

        let config = SwitchConfig {
            datapath_id: datapath_id,
            lookup_delay: Duration::from_nanos(lookup_delay_ns),
            flags: flags as u16,
            miss_send_len: number(conf, SWITCH_SECTION, MISS_SEND_LEN_KEY, defaults.miss_send_len)?,
            exact_max: number(conf, TABLES_SECTION, EXACT_MAX_KEY, defaults.exact_max)?,
            wildcard_max: number(conf, TABLES_SECTION, WILDCARD_MAX_KEY, defaults.wildcard_max)?,
            max_vports: number(conf, VPORTS_SECTION, MAX_KEY, defaults.max_vports)?,
            ..defaults
        };
        debug!("Got {:?}", config);
        Ok(config)
    }
}

/// Which controller the switch is connected to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControllerKind {
    Learning,
    Drop,
    None,
}

impl FromStr for ControllerKind {
    type Err = Error;

    fn from_str(kind: &str) -> Result<ControllerKind, Self::Err> {
        match kind {
            "learning" => Ok(ControllerKind::Learning),
            "drop" => Ok(ControllerKind::Drop),
            "none" => Ok(ControllerKind::None),
            _ => Err(Error::InvalidValue(TOPOLOGY_SECTION, CONTROLLER_KEY, kind.to_string())),
        }
    }
}

/// The simulated network around the switch
#[derive(Debug, Clone, PartialEq)]
pub struct Topology {
    /// One host is attached to every switch port
    pub hosts: usize,
    pub controller: ControllerKind,
    /// Hard timeout of the learned flows, 0 is permanent
    pub expiration_secs: u16,
    /// Frames each host sends
    pub frames: usize,
}

impl Default for Topology {
    fn default() -> Self {
        Topology {
            hosts: 3,
            controller: ControllerKind::Learning,
            expiration_secs: 0,
            frames: 10,
        }
    }
}

impl Topology {
    pub fn build_controller(&self) -> Option<Box<dyn Controller>> {
        match self.controller {
            ControllerKind::Learning => Some(Box::new(LearningController::new(self.expiration_secs))),
            ControllerKind::Drop => Some(Box::new(DropController::new())),
            ControllerKind::None => None,
        }
    }
}

impl Section for Topology {
    type S = Topology;

    fn from_ini(conf: &Ini) -> Result<Self::S, Error> {
        debug!("Reading [{}] section", TOPOLOGY_SECTION);
        let defaults = Topology::default();

        let hosts = number(conf, TOPOLOGY_SECTION, HOSTS_KEY, defaults.hosts)?;
        if hosts == 0 {
            return Err(Error::InvalidValue(TOPOLOGY_SECTION, HOSTS_KEY, hosts.to_string()));
        }
        let controller = match value(conf, TOPOLOGY_SECTION, CONTROLLER_KEY) {
            Some(kind) => ControllerKind::from_str(kind)?,
            None => defaults.controller,
        };
        let topology = Topology {
            hosts: hosts,
            controller: controller,
            expiration_secs: number(conf, TOPOLOGY_SECTION, EXPIRATION_KEY, defaults.expiration_secs)?,
            frames: number(conf, TOPOLOGY_SECTION, FRAMES_KEY, defaults.frames)?,
        };
        debug!("Got {:?}", topology);
        Ok(topology)
    }
}

impl Section for Ipv4Network {
    type S = Ipv4Network;

    fn from_ini(conf: &Ini) -> Result<Self::S, Error> {
        debug!("Reading [{}] section", NET_SECTION);

        let net = match value(conf, NET_SECTION, HOSTS_KEY) {
            Some(hosts) => {
                Ipv4Network::from_str(hosts).map_err(|e| Error::InvalidCidr(e, hosts.to_string()))?
            }
            None => Ipv4Network::new(Ipv4Addr::new(10, 0, 0, 0), 24)
                .map_err(|e| Error::InvalidCidr(e, "10.0.0.0/24".to_string()))?,
        };

        debug!("Got {:?}", net);
        Ok(net)
    }
}

/// A complete simulation setup
#[derive(Debug, Clone)]
pub struct Setup {
    pub switch: SwitchConfig,
    pub topology: Topology,
    pub network: Ipv4Network,
}

impl Setup {
    /// The address of host `idx`, counting from the first address after the network address
    pub fn host_addr(&self, idx: usize) -> Option<Ipv4Addr> {
        let capacity = 1u64 << (32 - u32::from(self.network.prefix()));
        let offset = idx as u64 + 1;
        // the broadcast address is left out
        if offset + 1 >= capacity {
            return None;
        }
        Some(Ipv4Addr::from(u32::from(self.network.network()) + offset as u32))
    }
}

/// Reads every section of `conf`. Missing sections and keys get their defaults.
pub fn parse(conf: &Ini) -> Result<Setup, Error> {
    let setup = Setup {
        switch: SwitchConfig::from_ini(conf)?,
        topology: Topology::from_ini(conf)?,
        network: Ipv4Network::from_ini(conf)?,
    };
    if setup.host_addr(setup.topology.hosts - 1).is_none() {
        return Err(Error::InvalidValue(
            TOPOLOGY_SECTION,
            HOSTS_KEY,
            setup.topology.hosts.to_string(),
        ));
    }
    Ok(setup)
}

/// The setup of a run without an INI file
pub fn defaults() -> Result<Setup, Error> {
    parse(&Ini::new())
}

pub fn parse_file(path: &str) -> Result<Setup, Error> {
    info!("Reading INI file {}", path);

    let conf = match Ini::load_from_file(path) {
        Ok(i) => i,
        Err(e) => {
            return Err(Error::Ini(e));
        }
    };
    parse(&conf)
}
