use crate::id::{check_instance_id, check_region_id};
use crate::Result;

/// The `(region_id, instance_id)` pair stamped into every ID a generator
/// mints.
///
/// Uniqueness across processes depends entirely on deployments holding
/// disjoint origins; nothing here coordinates between instances.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Origin {
    region_id: u8,
    instance_id: u16,
}

impl Origin {
    /// Validates and builds an origin.
    ///
    /// # Errors
    ///
    /// - [`Error::RegionIdOverflow`] if `region_id > 15`
    /// - [`Error::InstanceIdOverflow`] if `instance_id > 1023`
    ///
    /// [`Error::RegionIdOverflow`]: crate::Error::RegionIdOverflow
    /// [`Error::InstanceIdOverflow`]: crate::Error::InstanceIdOverflow
    pub fn new(region_id: u8, instance_id: u16) -> Result<Self> {
        check_region_id(u64::from(region_id))?;
        check_instance_id(u64::from(instance_id))?;
        Ok(Self {
            region_id,
            instance_id,
        })
    }

    pub const fn region_id(&self) -> u8 {
        self.region_id
    }

    pub const fn instance_id(&self) -> u16 {
        self.instance_id
    }
}
