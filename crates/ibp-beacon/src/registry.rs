//! The 18 beacon stations, indexed by transmission slot
//!
//! Slot order is the order in which the stations transmit, not alphabetical.
//! Table lines use the format `callsign, city, country, grid`.

use std::fmt;

use crate::error::BeaconError;

/// Number of beacons, and of 10-second slots in a cycle
pub const SLOT_COUNT: usize = 18;

/// Station list published by the NCDXF, in slot order
const NCDXF_TABLE: [&str; SLOT_COUNT] = [
    "4U1UN, New York City, United Nations, FN30as",
    "VE8AT, Inuvik NT, Canada, CP38gh",
    "W6WX, Mt. Umunhum, United States, CM97bd",
    "KH6RS, Maui, Hawaii, BL10ts",
    "ZL6B, Masterton, New Zealand, RE78tw",
    "VK6RBP, Rolystone, Australia, OF87av",
    "JA2IGY, Mt. Asama, Japan, PM84jk",
    "RR9O, Novosibirsk, Russia, NO14kx",
    "VR2B, Hong Kong, Hong Kong, OL72bg",
    "4S7B, Colombo, Sri Lanka, MJ96wv",
    "ZS6DN, Pretoria, South Africa, KG33xi",
    "5Z4B, Kariobangi, Kenya, KI88ks",
    "4X6TU, Tel Aviv, Israel, KM72jb",
    "OH2B, Lohja, Finland, KP20eh",
    "CS3B, São Jorge, Madeira, IM12mt",
    "LU4AA, Buenos Aires, Argentina, GF05tj",
    "OA4B, Lima, Peru, FH17mw",
    "YV5B, Caracas, Venezuela, FJ69cc",
];

/// One beacon station
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Beacon {
    /// Transmission slot (0-17)
    pub slot: usize,
    pub callsign: String,
    pub city: String,
    /// DX entity / country
    pub country: String,
    /// Maidenhead grid locator
    pub grid: String,
}

impl Beacon {
    /// Parse one table line: `callsign, city, country, grid`
    pub fn parse(slot: usize, line: &str) -> Result<Self, BeaconError> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let [callsign, city, country, grid] = fields.as_slice() else {
            return Err(BeaconError::InvalidTable(format!(
                "slot {slot}: expected 'callsign, city, country, grid', got {line:?}"
            )));
        };
        if callsign.is_empty() {
            return Err(BeaconError::InvalidTable(format!(
                "slot {slot}: missing callsign"
            )));
        }
        Ok(Self {
            slot,
            callsign: callsign.to_string(),
            city: city.to_string(),
            country: country.to_string(),
            grid: grid.to_string(),
        })
    }
}

impl fmt::Display for Beacon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}, {}, {}, {}",
            self.slot, self.callsign, self.city, self.country, self.grid
        )
    }
}

/// Read-only slot-to-beacon table
///
/// A populated registry always holds exactly one beacon per slot. The
/// [`Default`] registry is empty and fails every lookup with
/// [`BeaconError::Unpopulated`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeaconRegistry {
    beacons: Vec<Beacon>,
}

impl BeaconRegistry {
    /// Built-in NCDXF station list
    pub fn ncdxf() -> Self {
        let beacons = NCDXF_TABLE
            .iter()
            .enumerate()
            .filter_map(|(slot, line)| Beacon::parse(slot, line).ok())
            .collect();
        Self { beacons }
    }

    /// Build a registry, checking that every slot 0-17 appears exactly once
    pub fn from_entries(entries: impl IntoIterator<Item = Beacon>) -> Result<Self, BeaconError> {
        let mut slots: Vec<Option<Beacon>> = vec![None; SLOT_COUNT];
        for beacon in entries {
            let slot = beacon.slot;
            let entry = slots.get_mut(slot).ok_or_else(|| {
                BeaconError::InvalidTable(format!("slot {slot} out of range"))
            })?;
            if entry.is_some() {
                return Err(BeaconError::InvalidTable(format!("duplicate slot {slot}")));
            }
            *entry = Some(beacon);
        }

        let missing: Vec<String> = slots
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_none())
            .map(|(i, _)| i.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(BeaconError::InvalidTable(format!(
                "missing slots {}",
                missing.join(", ")
            )));
        }

        let beacons: Vec<Beacon> = slots.into_iter().flatten().collect();
        tracing::debug!("Loaded {} beacons", beacons.len());
        Ok(Self { beacons })
    }

    /// Parse `(slot, line)` pairs, e.g. the `beacons` section of a config file
    pub fn from_lines<'a>(
        lines: impl IntoIterator<Item = (usize, &'a str)>,
    ) -> Result<Self, BeaconError> {
        let beacons = lines
            .into_iter()
            .map(|(slot, line)| Beacon::parse(slot, line))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_entries(beacons)
    }

    /// Beacon transmitting in the given slot
    pub fn lookup(&self, slot: usize) -> Result<&Beacon, BeaconError> {
        if self.beacons.is_empty() {
            return Err(BeaconError::Unpopulated);
        }
        self.beacons
            .get(slot)
            .ok_or(BeaconError::SlotOutOfRange(slot))
    }

    /// Same as [`lookup`](Self::lookup)
    pub fn get_beacon(&self, slot: usize) -> Result<&Beacon, BeaconError> {
        self.lookup(slot)
    }

    /// Beacons in slot order
    pub fn iter(&self) -> impl Iterator<Item = &Beacon> {
        self.beacons.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.beacons.is_empty()
    }

    pub fn len(&self) -> usize {
        self.beacons.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ncdxf_table_is_complete() {
        let registry = BeaconRegistry::ncdxf();
        assert_eq!(registry.len(), SLOT_COUNT);
        for (i, beacon) in registry.iter().enumerate() {
            assert_eq!(beacon.slot, i);
        }
        assert_eq!(registry.lookup(0).unwrap().callsign, "4U1UN");
        assert_eq!(registry.lookup(14).unwrap().city, "São Jorge");
        assert_eq!(registry.lookup(17).unwrap().callsign, "YV5B");
    }

    #[test]
    fn test_lookup_errors() {
        let registry = BeaconRegistry::ncdxf();
        assert_eq!(registry.lookup(18), Err(BeaconError::SlotOutOfRange(18)));
        assert_eq!(
            BeaconRegistry::default().lookup(0),
            Err(BeaconError::Unpopulated)
        );
    }

    #[test]
    fn test_parse_trims_fields() {
        let b = Beacon::parse(3, "  KH6RS,Maui ,  Hawaii, BL10ts ").unwrap();
        assert_eq!(b.callsign, "KH6RS");
        assert_eq!(b.city, "Maui");
        assert_eq!(b.country, "Hawaii");
        assert_eq!(b.grid, "BL10ts");
        assert_eq!(b.to_string(), "3: KH6RS, Maui, Hawaii, BL10ts");
    }

    #[test]
    fn test_parse_rejects_wrong_field_count() {
        assert!(matches!(
            Beacon::parse(0, "4U1UN, New York City, FN30as"),
            Err(BeaconError::InvalidTable(_))
        ));
        assert!(matches!(
            Beacon::parse(0, ", a, b, c"),
            Err(BeaconError::InvalidTable(_))
        ));
    }

    #[test]
    fn test_from_entries_validates_slots() {
        let mut beacons: Vec<Beacon> = BeaconRegistry::ncdxf().iter().cloned().collect();
        beacons.reverse();
        let registry = BeaconRegistry::from_entries(beacons.clone()).unwrap();
        assert_eq!(registry, BeaconRegistry::ncdxf());

        let mut short = beacons.clone();
        short.pop();
        assert!(matches!(
            BeaconRegistry::from_entries(short),
            Err(BeaconError::InvalidTable(_))
        ));

        let mut dup = beacons.clone();
        dup[0].slot = 1;
        assert!(BeaconRegistry::from_entries(dup).is_err());

        let mut out_of_range = beacons;
        out_of_range[0].slot = 18;
        assert!(BeaconRegistry::from_entries(out_of_range).is_err());
    }

    #[test]
    fn test_from_lines() {
        let lines: Vec<(usize, &str)> = NCDXF_TABLE.iter().copied().enumerate().collect();
        let registry = BeaconRegistry::from_lines(lines).unwrap();
        assert_eq!(registry.get_beacon(7).unwrap().callsign, "RR9O");
    }
}
