// src/model/architecture.rs

//! Operating system and CPU architecture pairs
//!
//! Architectures are written `OS-CPU` (`Linux-x86_64`, `*-*`, `Windows-i586`).
//! Compatibility is asymmetric: it asks whether an implementation built for
//! one architecture can run on a given system.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Operating system part of an architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Os {
    #[default]
    All,
    Linux,
    Solaris,
    FreeBsd,
    MacOsx,
    Darwin,
    Cygwin,
    Posix,
    Windows,
    Unknown,
}

impl Os {
    pub fn parse(s: &str) -> Self {
        match s {
            "*" => Self::All,
            "Linux" => Self::Linux,
            "Solaris" => Self::Solaris,
            "FreeBSD" => Self::FreeBsd,
            "MacOSX" => Self::MacOsx,
            "Darwin" => Self::Darwin,
            "Cygwin" => Self::Cygwin,
            "POSIX" => Self::Posix,
            "Windows" => Self::Windows,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "*",
            Self::Linux => "Linux",
            Self::Solaris => "Solaris",
            Self::FreeBsd => "FreeBSD",
            Self::MacOsx => "MacOSX",
            Self::Darwin => "Darwin",
            Self::Cygwin => "Cygwin",
            Self::Posix => "POSIX",
            Self::Windows => "Windows",
            Self::Unknown => "unknown",
        }
    }

    /// Whether software built for `self` runs on `system`
    ///
    /// POSIX covers every Unix-like system, Windows binaries run under
    /// Cygwin and Darwin binaries run on MacOSX. None of these hold in
    /// reverse.
    pub fn is_compatible(&self, system: &Os) -> bool {
        if *self == Os::Unknown || *system == Os::Unknown {
            return false;
        }
        if self == system || *self == Os::All || *system == Os::All {
            return true;
        }

        match self {
            Os::Windows => *system == Os::Cygwin,
            Os::Darwin => *system == Os::MacOsx,
            Os::Posix => matches!(
                system,
                Os::Linux | Os::Solaris | Os::FreeBsd | Os::MacOsx | Os::Darwin | Os::Cygwin
            ),
            _ => false,
        }
    }

    /// The OS this process runs on
    pub fn current() -> Self {
        match std::env::consts::OS {
            "linux" => Self::Linux,
            "macos" => Self::MacOsx,
            "windows" => Self::Windows,
            "freebsd" => Self::FreeBsd,
            "solaris" | "illumos" => Self::Solaris,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// CPU part of an architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cpu {
    #[default]
    All,
    I386,
    I486,
    I586,
    I686,
    X86_64,
    Ppc,
    Ppc64,
    /// Source code, to be compiled
    Source,
    Unknown,
}

impl Cpu {
    pub fn parse(s: &str) -> Self {
        match s {
            "*" => Self::All,
            "i386" => Self::I386,
            "i486" => Self::I486,
            "i586" => Self::I586,
            "i686" => Self::I686,
            "x86_64" => Self::X86_64,
            "ppc" => Self::Ppc,
            "ppc64" => Self::Ppc64,
            "src" => Self::Source,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "*",
            Self::I386 => "i386",
            Self::I486 => "i486",
            Self::I586 => "i586",
            Self::I686 => "i686",
            Self::X86_64 => "x86_64",
            Self::Ppc => "ppc",
            Self::Ppc64 => "ppc64",
            Self::Source => "src",
            Self::Unknown => "unknown",
        }
    }

    /// Generation index within the 32-bit x86 family
    fn x86_generation(&self) -> Option<u8> {
        match self {
            Self::I386 => Some(3),
            Self::I486 => Some(4),
            Self::I586 => Some(5),
            Self::I686 => Some(6),
            _ => None,
        }
    }

    /// Whether code built for `self` runs on `system`
    ///
    /// Older 32-bit x86 code runs on newer 32-bit x86 systems. Code never
    /// crosses between 32-bit and 64-bit identifiers.
    pub fn is_compatible(&self, system: &Cpu) -> bool {
        if *self == Cpu::Unknown || *system == Cpu::Unknown {
            return false;
        }
        if self == system || *self == Cpu::All || *system == Cpu::All {
            return true;
        }

        match (self.x86_generation(), system.x86_generation()) {
            (Some(built_for), Some(running_on)) => built_for <= running_on,
            _ => false,
        }
    }

    /// The CPU this process runs on
    pub fn current() -> Self {
        match std::env::consts::ARCH {
            "x86_64" => Self::X86_64,
            "x86" => Self::I686,
            "powerpc" => Self::Ppc,
            "powerpc64" => Self::Ppc64,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for Cpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An OS and CPU combination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Architecture {
    pub os: Os,
    pub cpu: Cpu,
}

impl Architecture {
    pub const fn new(os: Os, cpu: Cpu) -> Self {
        Self { os, cpu }
    }

    /// Parse `OS-CPU`; unrecognized names become `unknown`
    pub fn parse(s: &str) -> Result<Self> {
        let (os, cpu) = s.split_once('-').ok_or_else(|| {
            Error::ParseError(format!("Architecture '{}' must have the form OS-CPU", s))
        })?;
        if cpu.contains('-') {
            return Err(Error::ParseError(format!(
                "Architecture '{}' must have the form OS-CPU",
                s
            )));
        }
        Ok(Self::new(Os::parse(os), Cpu::parse(cpu)))
    }

    /// The architecture of the running system
    pub fn current_system() -> Self {
        Self::new(Os::current(), Cpu::current())
    }

    /// Whether an implementation for `self` runs on `system`
    pub fn is_compatible(&self, system: &Architecture) -> bool {
        self.os.is_compatible(&system.os) && self.cpu.is_compatible(&system.cpu)
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.cpu)
    }
}

impl FromStr for Architecture {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Architecture::parse(s)
    }
}

impl Serialize for Architecture {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Architecture {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Architecture::parse(&s).map_err(serde::de::Error::custom)
    }
}
