//! Huawei Cloud resource type vocabulary

use crate::registry::{Registry, ResourceKind};

/// Supported Huawei Cloud resource identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HuaweiResourceType {
    ComputeInstance,
    Vpc,
    VpcSubnet,
    Eip,
    EvsVolume,
    NatGateway,
    ObsBucket,
}

impl ResourceKind for HuaweiResourceType {
    fn as_str(&self) -> &'static str {
        match self {
            HuaweiResourceType::ComputeInstance => "huaweicloud_compute_instance",
            HuaweiResourceType::Vpc => "huaweicloud_vpc",
            HuaweiResourceType::VpcSubnet => "huaweicloud_vpc_subnet",
            HuaweiResourceType::Eip => "huaweicloud_vpc_eip",
            HuaweiResourceType::EvsVolume => "huaweicloud_evs_volume",
            HuaweiResourceType::NatGateway => "huaweicloud_nat_gateway",
            HuaweiResourceType::ObsBucket => "huaweicloud_obs_bucket",
        }
    }
}

/// Declaration order here is the order presented to end users.
pub const RESOURCE_TYPES: &[HuaweiResourceType] = &[
    HuaweiResourceType::ComputeInstance,
    HuaweiResourceType::Vpc,
    HuaweiResourceType::VpcSubnet,
    HuaweiResourceType::Eip,
    HuaweiResourceType::EvsVolume,
    HuaweiResourceType::NatGateway,
    HuaweiResourceType::ObsBucket,
];

pub fn registry() -> Registry<HuaweiResourceType> {
    Registry::new(RESOURCE_TYPES)
}
