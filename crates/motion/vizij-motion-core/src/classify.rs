//! Channel classification into body-part partitions.
//!
//! Four independent partitions exist (energy, delay, curve, axis-point). Each is
//! an ordered table of name patterns; the first matching pattern wins and a
//! channel matching none is excluded from that partition's effects. Tables are
//! compiled once, and a channel's keys are resolved once at load time into a
//! [`ChannelProfile`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::data::Channel;

/// Energy (duration scaling) regions.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum EnergyPart {
    Upper,
    Lower,
}

/// Body regions shared by the delay and curve partitions.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum BodyPart {
    Head,
    Body,
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
}

/// Limb regions used for axis-point selection.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum LimbPart {
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
}

/// Ordered first-match table from pattern to key.
#[derive(Debug)]
pub struct Partition<K: Copy> {
    rules: Vec<(K, Regex)>,
}

impl<K: Copy> Partition<K> {
    fn compile(rules: &[(K, &str)]) -> Self {
        Self {
            rules: rules
                .iter()
                .map(|(key, pattern)| {
                    // Patterns are compile-time constants covered by tests.
                    let re = Regex::new(pattern).expect("partition pattern must compile");
                    (*key, re)
                })
                .collect(),
        }
    }

    /// First key whose pattern matches `joint`.
    pub fn classify(&self, joint: &str) -> Option<K> {
        self.rules
            .iter()
            .find(|(_, re)| re.is_match(joint))
            .map(|(key, _)| *key)
    }
}

const LEFT_ARM: &str = r"(?i)left(shoulder|forearm|arm|hand)";
const RIGHT_ARM: &str = r"(?i)right(shoulder|forearm|arm|hand)";
const LEFT_LEG: &str = r"(?i)left(upleg|leg|foot|toe)";
const RIGHT_LEG: &str = r"(?i)right(upleg|leg|foot|toe)";

pub static ENERGY: Lazy<Partition<EnergyPart>> = Lazy::new(|| {
    Partition::compile(&[
        (
            EnergyPart::Upper,
            r"(?i)(spine|neck|head|shoulder|arm|hand|thumb|index|middle|ring|pinky)",
        ),
        (EnergyPart::Lower, r"(?i)(hips|upleg|leg|foot|toe|root)"),
    ])
});

pub static DELAY: Lazy<Partition<BodyPart>> = Lazy::new(|| {
    Partition::compile(&[
        (BodyPart::Head, r"(?i)(neck|head)"),
        (BodyPart::LeftArm, LEFT_ARM),
        (BodyPart::RightArm, RIGHT_ARM),
        (BodyPart::LeftLeg, LEFT_LEG),
        (BodyPart::RightLeg, RIGHT_LEG),
        (BodyPart::Body, r"(?i)(hips|spine|root)"),
    ])
});

pub static CURVE: Lazy<Partition<BodyPart>> = Lazy::new(|| {
    Partition::compile(&[
        (BodyPart::Head, r"(?i)(neck|head)"),
        (BodyPart::Body, r"(?i)(hips|spine|root)"),
        (BodyPart::LeftArm, LEFT_ARM),
        (BodyPart::RightArm, RIGHT_ARM),
        (BodyPart::LeftLeg, LEFT_LEG),
        (BodyPart::RightLeg, RIGHT_LEG),
    ])
});

pub static AXIS_POINT: Lazy<Partition<LimbPart>> = Lazy::new(|| {
    Partition::compile(&[
        (LimbPart::LeftArm, LEFT_ARM),
        (LimbPart::RightArm, RIGHT_ARM),
        (LimbPart::LeftLeg, LEFT_LEG),
        (LimbPart::RightLeg, RIGHT_LEG),
    ])
});

static ROOT_POSITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(hips|root)\.position$").expect("root pattern must compile")
});

/// Partition keys resolved once per channel.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelProfile {
    pub energy: Option<EnergyPart>,
    pub delay: Option<BodyPart>,
    pub curve: Option<BodyPart>,
    pub axis_point: Option<LimbPart>,
    /// Position channel of the root joint (subject to position locking).
    pub root_position: bool,
}

impl ChannelProfile {
    pub fn of(channel: &Channel) -> Self {
        let joint = channel.joint();
        Self {
            energy: ENERGY.classify(joint),
            delay: DELAY.classify(joint),
            curve: CURVE.classify(joint),
            axis_point: AXIS_POINT.classify(joint),
            root_position: ROOT_POSITION.is_match(&channel.name),
        }
    }
}
