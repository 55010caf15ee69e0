//! Name-based link type detection
//!
//! Used when the platform offers no structured link type (macOS, Windows,
//! or Linux without sysfs). Interface naming conventions differ per platform,
//! so names are matched against the conventions of the running OS first and
//! a generic rule set afterwards.

use log::trace;

use crate::collectors::adapters::LinkType;

/// Supported platforms
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Platform {
    MacOS,
    Linux,
    Windows,
    Unknown,
}

impl Platform {
    /// Detect the current platform
    pub fn current() -> Self {
        match std::env::consts::OS {
            "macos" => Platform::MacOS,
            "linux" => Platform::Linux,
            "windows" => Platform::Windows,
            _ => Platform::Unknown,
        }
    }
}

/// Classifies an adapter from its name and description on the current platform
pub fn classify_link(name: &str, description: &str, is_loopback: bool) -> LinkType {
    classify_link_for(Platform::current(), name, description, is_loopback)
}

/// Classifies an adapter from its name and description on `platform`
pub fn classify_link_for(
    platform: Platform,
    name: &str,
    description: &str,
    is_loopback: bool,
) -> LinkType {
    if is_loopback {
        return LinkType::Loopback;
    }

    let name_lower = name.to_lowercase();
    let description_lower = description.to_lowercase();

    let link_type = match platform {
        Platform::MacOS => classify_macos(&name_lower),
        Platform::Linux => classify_linux(&name_lower),
        Platform::Windows => classify_windows(&name_lower, &description_lower),
        Platform::Unknown => None,
    }
    .unwrap_or_else(|| classify_generic(&name_lower));

    trace!("Classified adapter '{}' ({:?}) as {}", name, platform, link_type);
    link_type
}

fn classify_macos(name: &str) -> Option<LinkType> {
    match name {
        name if name.starts_with("lo") => Some(LinkType::Loopback),
        // en0 is Wi-Fi on laptops and Ethernet on desktops; both count as physical
        name if name.starts_with("en") => Some(LinkType::Wired),
        // Apple virtual links: VPN tunnels, AirDrop, low-latency WLAN, bridges
        name if ["utun", "ipsec", "ppp", "awdl", "llw", "anpi", "ap", "bridge", "gif", "stf"]
            .iter()
            .any(|prefix| name.starts_with(prefix)) =>
        {
            Some(LinkType::Other)
        }
        _ => None,
    }
}

fn classify_linux(name: &str) -> Option<LinkType> {
    match name {
        name if name == "lo" => Some(LinkType::Loopback),
        name if name.starts_with("wl") => Some(LinkType::Wireless),
        // Classic and predictable names: eth0, eno1, enp3s0, ens33, em1
        name if name.starts_with("eth") || name.starts_with("en") || name.starts_with("em") => {
            Some(LinkType::Wired)
        }
        name if ["tun", "tap", "wg", "ppp", "sit", "gre", "ip6tnl"]
            .iter()
            .any(|prefix| name.starts_with(prefix)) =>
        {
            Some(LinkType::Other)
        }
        _ => None,
    }
}

fn classify_windows(name: &str, description: &str) -> Option<LinkType> {
    let mentions = |needle: &str| name.contains(needle) || description.contains(needle);

    if mentions("loopback") {
        Some(LinkType::Loopback)
    } else if mentions("wi-fi") || mentions("wifi") || mentions("wireless") || mentions("802.11") {
        Some(LinkType::Wireless)
    } else if mentions("ethernet") || mentions("gbe") || mentions("gigabit") {
        Some(LinkType::Wired)
    } else if mentions("teredo") || mentions("isatap") || mentions("6to4") || mentions("ip-https") {
        Some(LinkType::Other)
    } else {
        None
    }
}

fn classify_generic(name: &str) -> LinkType {
    match name {
        name if name.starts_with("lo") => LinkType::Loopback,
        name if name.starts_with("wl") || name.contains("wifi") => LinkType::Wireless,
        name if name.starts_with("eth") || name.starts_with("en") => LinkType::Wired,
        _ => LinkType::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linux_names() {
        let test_cases = vec![
            ("eth0", LinkType::Wired),
            ("eno1", LinkType::Wired),
            ("enp3s0", LinkType::Wired),
            ("wlan0", LinkType::Wireless),
            ("wlp2s0", LinkType::Wireless),
            ("tun0", LinkType::Other),
            ("wg0", LinkType::Other),
            ("lo", LinkType::Loopback),
            ("can0", LinkType::Other),
        ];

        for (name, expected) in test_cases {
            assert_eq!(
                classify_link_for(Platform::Linux, name, "", false),
                expected,
                "Interface {} classification mismatch",
                name
            );
        }
    }

    #[test]
    fn test_macos_names() {
        let test_cases = vec![
            ("en0", LinkType::Wired),
            ("en5", LinkType::Wired),
            ("utun3", LinkType::Other),
            ("awdl0", LinkType::Other),
            ("llw0", LinkType::Other),
            ("bridge0", LinkType::Other),
            ("lo0", LinkType::Loopback),
        ];

        for (name, expected) in test_cases {
            assert_eq!(
                classify_link_for(Platform::MacOS, name, "", false),
                expected,
                "Interface {} classification mismatch",
                name
            );
        }
    }

    #[test]
    fn test_windows_descriptions() {
        assert_eq!(
            classify_link_for(Platform::Windows, "Wi-Fi", "Intel(R) Wi-Fi 6 AX201 160MHz", false),
            LinkType::Wireless
        );
        assert_eq!(
            classify_link_for(Platform::Windows, "Ethernet", "Realtek PCIe GbE Family Controller", false),
            LinkType::Wired
        );
        assert_eq!(
            classify_link_for(Platform::Windows, "Teredo", "Teredo Tunneling Pseudo-Interface", false),
            LinkType::Other
        );
        assert_eq!(
            classify_link_for(Platform::Windows, "Loopback Pseudo-Interface 1", "", false),
            LinkType::Loopback
        );
    }

    #[test]
    fn test_loopback_flag_wins() {
        assert_eq!(
            classify_link_for(Platform::Linux, "eth0", "", true),
            LinkType::Loopback
        );
    }

    #[test]
    fn test_platform_detection() {
        let platform = Platform::current();
        if cfg!(target_os = "linux") {
            assert_eq!(platform, Platform::Linux);
        }
    }
}
