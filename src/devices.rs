//! Device vendors: the abstract-factory family.
//!
//! A vendor factory produces a matching smartphone and tablet. Products
//! describe what they did instead of printing it, so callers decide where the
//! output goes.

use crate::error::UnknownSelector;
use crate::registry::Registry;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub trait SmartPhone: Send + Sync {
    fn model(&self) -> &str;
    fn switch_on(&self) -> String;
    fn ring(&self) -> String;
}

pub trait Tablet: Send + Sync {
    fn model(&self) -> &str;
    fn switch_on(&self) -> String;
}

pub trait DeviceFactory: Send + Sync {
    fn vendor(&self) -> Vendor;
    fn create_smartphone(&self) -> Box<dyn SmartPhone>;
    fn create_tablet(&self) -> Box<dyn Tablet>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vendor {
    Apple,
    Samsung,
}

impl Vendor {
    pub const ALL: [Vendor; 2] = [Vendor::Apple, Vendor::Samsung];

    pub fn selector(self) -> &'static str {
        match self {
            Vendor::Apple => "apple",
            Vendor::Samsung => "samsung",
        }
    }
}

impl FromStr for Vendor {
    type Err = UnknownSelector;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Vendor::ALL
            .into_iter()
            .find(|candidate| candidate.selector() == wanted)
            .ok_or_else(|| UnknownSelector::new("vendor", s))
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.selector())
    }
}

// ============================================================================
// Apple
// ============================================================================

pub struct AppleSmartPhone {
    model: String,
}

impl SmartPhone for AppleSmartPhone {
    fn model(&self) -> &str {
        &self.model
    }

    fn switch_on(&self) -> String {
        format!("{} shows the Apple logo", self.model)
    }

    fn ring(&self) -> String {
        format!("{} plays Opening", self.model)
    }
}

pub struct AppleTablet {
    model: String,
}

impl Tablet for AppleTablet {
    fn model(&self) -> &str {
        &self.model
    }

    fn switch_on(&self) -> String {
        format!("{} shows the Apple logo", self.model)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppleFactory;

impl DeviceFactory for AppleFactory {
    fn vendor(&self) -> Vendor {
        Vendor::Apple
    }

    fn create_smartphone(&self) -> Box<dyn SmartPhone> {
        Box::new(AppleSmartPhone {
            model: "iPhone".to_string(),
        })
    }

    fn create_tablet(&self) -> Box<dyn Tablet> {
        Box::new(AppleTablet {
            model: "iPad".to_string(),
        })
    }
}

// ============================================================================
// Samsung
// ============================================================================

pub struct SamsungSmartPhone {
    model: String,
}

impl SmartPhone for SamsungSmartPhone {
    fn model(&self) -> &str {
        &self.model
    }

    fn switch_on(&self) -> String {
        format!("{} boots One UI", self.model)
    }

    fn ring(&self) -> String {
        format!("{} plays Over the Horizon", self.model)
    }
}

pub struct SamsungTablet {
    model: String,
}

impl Tablet for SamsungTablet {
    fn model(&self) -> &str {
        &self.model
    }

    fn switch_on(&self) -> String {
        format!("{} boots One UI", self.model)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SamsungFactory;

impl DeviceFactory for SamsungFactory {
    fn vendor(&self) -> Vendor {
        Vendor::Samsung
    }

    fn create_smartphone(&self) -> Box<dyn SmartPhone> {
        Box::new(SamsungSmartPhone {
            model: "Galaxy S".to_string(),
        })
    }

    fn create_tablet(&self) -> Box<dyn Tablet> {
        Box::new(SamsungTablet {
            model: "Galaxy Tab".to_string(),
        })
    }
}

/// Vendor registry. Unknown vendors fall back to Samsung.
pub fn device_registry() -> Registry<dyn DeviceFactory> {
    let mut registry =
        Registry::<dyn DeviceFactory>::new("vendor", Vendor::Samsung.selector(), || {
            Arc::new(SamsungFactory)
        });
    registry.register(Vendor::Apple.selector(), || Arc::new(AppleFactory));
    registry
}
