//! Threshold Joye-Libert with integer sharing of the user keys.

use super::{KeySharing, ThresholdJoyeLibert, ThresholdSetup};
use crate::jl::{SchemeParameters, UserKey};
use crate::ss::{IntegerSharing, Share, ThresholdSharing};
use crate::Result;
use num_bigint::{BigInt, BigUint};
use rand::{CryptoRng, RngCore};
use std::sync::Arc;

impl KeySharing for IntegerSharing {
    /// Integer Lagrange coefficients carry one factor `delta` and the shared
    /// secret another.
    fn compensation_scale(&self) -> BigUint {
        self.delta() * self.delta()
    }

    fn share_key<R: RngCore + CryptoRng>(
        &self,
        key: &UserKey,
        rng: &mut R,
    ) -> Result<Vec<Share<BigInt>>> {
        self.share(key.secret(), rng)
    }

    fn exponent(value: &BigInt) -> BigInt {
        value.clone()
    }
}

impl ThresholdJoyeLibert<IntegerSharing> {
    /// Creates the scheme for the given parameters. The user keys are shared
    /// over the integers, so every user can share its own key.
    pub fn new(par: &Arc<SchemeParameters>) -> Result<Self> {
        let sharing = IntegerSharing::new(par.key_size(), par.sigma(), *par.threshold_config())?;
        Ok(Self::from_parts(par, sharing))
    }

    /// Generate the public parameters, the keys and the shares of every user
    /// key.
    pub fn setup<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Result<ThresholdSetup<BigInt>> {
        let (public, server, users) = self.base().setup(rng)?;
        let shares = Self::deal(self.sharing(), &users, rng)?;
        log::debug!(
            "Shared {} user keys over the integers with threshold {}",
            users.len(),
            self.parameters().threshold()
        );
        Ok(ThresholdSetup {
            public,
            server,
            users,
            shares,
        })
    }
}
