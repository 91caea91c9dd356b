//! Near-earth SGP4
//!
//! Follows the revised Spacetrack Report #3 formulation (Vallado, Crawford,
//! Hujsak & Kelso 2006) with WGS-72 gravity constants. Everything derivable
//! from the element set alone is computed once in [`Sgp4::new`]; propagation
//! only evaluates the secular and periodic terms at the requested time.

use std::f64::consts::PI;

use chrono::{DateTime, TimeDelta, Utc};

use super::{DecayReason, PropagatedState, PropagationError};
use crate::model::tle::ElementSet;

const TWO_PI: f64 = 2.0 * PI;
const X2O3: f64 = 2.0 / 3.0;

// WGS-72
const EARTH_RADIUS_KM: f64 = 6378.135;
const MU: f64 = 398_600.8;
const J2: f64 = 0.001_082_616;
const J3: f64 = -0.000_002_538_81;
const J4: f64 = -0.000_001_655_97;
const J3_OVER_J2: f64 = J3 / J2;

/// Orbits with a period at or above this need the SDP4 deep-space terms.
pub const DEEP_SPACE_PERIOD_MINUTES: f64 = 225.0;

const KEPLER_TOLERANCE: f64 = 1e-12;
const KEPLER_MAX_ITERATIONS: u32 = 10;

/// sqrt(mu) in earth radii^1.5 per minute
fn xke() -> f64 {
    60.0 / (EARTH_RADIUS_KM * EARTH_RADIUS_KM * EARTH_RADIUS_KM / MU).sqrt()
}

/// Initialised propagator for one element set.
#[derive(Debug, Clone)]
pub struct Sgp4 {
    epoch: DateTime<Utc>,
    xke: f64,

    // mean elements at epoch, radians and radians/minute
    bstar: f64,
    ecco: f64,
    inclo: f64,
    nodeo: f64,
    argpo: f64,
    mo: f64,
    no: f64,

    // secular rates
    mdot: f64,
    argpdot: f64,
    nodedot: f64,
    nodecf: f64,

    // drag coefficients
    cc1: f64,
    cc4: f64,
    cc5: f64,
    t2cof: f64,
    t3cof: f64,
    t4cof: f64,
    t5cof: f64,
    d2: f64,
    d3: f64,
    d4: f64,
    omgcof: f64,
    xmcof: f64,
    eta: f64,
    delmo: f64,
    sinmao: f64,

    // long and short period coefficients
    con41: f64,
    x1mth2: f64,
    x7thm1: f64,
    xlcof: f64,
    aycof: f64,

    /// Perigee below 220 km: drop the higher order drag terms.
    simple: bool,
}

impl Sgp4 {
    pub fn new(elements: &ElementSet) -> Result<Self, PropagationError> {
        let xke = xke();

        let ecco = elements.eccentricity();
        let inclo = elements.inclination().to_radians();
        let nodeo = elements.right_ascension().to_radians();
        let argpo = elements.argument_of_perigee().to_radians();
        let mo = elements.mean_anomaly().to_radians();
        let bstar = elements.bstar();
        let no_kozai = elements.mean_motion() * TWO_PI / 1440.0;

        // recover the original mean motion and semi-major axis
        let eccsq = ecco * ecco;
        let omeosq = 1.0 - eccsq;
        let rteosq = omeosq.sqrt();
        let cosio = inclo.cos();
        let cosio2 = cosio * cosio;
        let sinio = inclo.sin();

        let ak = (xke / no_kozai).powf(X2O3);
        let d1 = 0.75 * J2 * (3.0 * cosio2 - 1.0) / (rteosq * omeosq);
        let del = d1 / (ak * ak);
        let adel = ak * (1.0 - del * del - del * (1.0 / 3.0 + 134.0 * del * del / 81.0));
        let del = d1 / (adel * adel);
        let no = no_kozai / (1.0 + del);

        let period_minutes = TWO_PI / no;
        if period_minutes >= DEEP_SPACE_PERIOD_MINUTES {
            return Err(PropagationError::UnsupportedOrbitRegime { period_minutes });
        }

        let ao = (xke / no).powf(X2O3);
        let po = ao * omeosq;
        let con42 = 1.0 - 5.0 * cosio2;
        let con41 = -con42 - cosio2 - cosio2;
        let posq = po * po;
        let rp = ao * (1.0 - ecco);
        let simple = rp < 220.0 / EARTH_RADIUS_KM + 1.0;

        // atmospheric density parameters, lowered for perigees under 156 km
        let mut sfour = 78.0 / EARTH_RADIUS_KM + 1.0;
        let mut qzms24 = ((120.0 - 78.0) / EARTH_RADIUS_KM).powi(4);
        let perigee_km = (rp - 1.0) * EARTH_RADIUS_KM;
        if perigee_km < 156.0 {
            let s = if perigee_km < 98.0 { 20.0 } else { perigee_km - 78.0 };
            qzms24 = ((120.0 - s) / EARTH_RADIUS_KM).powi(4);
            sfour = s / EARTH_RADIUS_KM + 1.0;
        }

        let pinvsq = 1.0 / posq;
        let tsi = 1.0 / (ao - sfour);
        let eta = ao * ecco * tsi;
        let etasq = eta * eta;
        let eeta = ecco * eta;
        let psisq = (1.0 - etasq).abs();
        let coef = qzms24 * tsi.powi(4);
        let coef1 = coef / psisq.powf(3.5);

        let cc2 = coef1
            * no
            * (ao * (1.0 + 1.5 * etasq + eeta * (4.0 + etasq))
                + 0.375 * J2 * tsi / psisq * con41 * (8.0 + 3.0 * etasq * (8.0 + etasq)));
        let cc1 = bstar * cc2;
        let cc3 = if ecco > 1.0e-4 {
            -2.0 * coef * tsi * J3_OVER_J2 * no * sinio / ecco
        } else {
            0.0
        };
        let x1mth2 = 1.0 - cosio2;
        let cc4 = 2.0
            * no
            * coef1
            * ao
            * omeosq
            * (eta * (2.0 + 0.5 * etasq) + ecco * (0.5 + 2.0 * etasq)
                - J2 * tsi / (ao * psisq)
                    * (-3.0 * con41 * (1.0 - 2.0 * eeta + etasq * (1.5 - 0.5 * eeta))
                        + 0.75 * x1mth2 * (2.0 * etasq - eeta * (1.0 + etasq)) * (2.0 * argpo).cos()));
        let cc5 = 2.0 * coef1 * ao * omeosq * (1.0 + 2.75 * (etasq + eeta) + eeta * etasq);

        let cosio4 = cosio2 * cosio2;
        let temp1 = 1.5 * J2 * pinvsq * no;
        let temp2 = 0.5 * temp1 * J2 * pinvsq;
        let temp3 = -0.46875 * J4 * pinvsq * pinvsq * no;
        let mdot = no
            + 0.5 * temp1 * rteosq * con41
            + 0.0625 * temp2 * rteosq * (13.0 - 78.0 * cosio2 + 137.0 * cosio4);
        let argpdot = -0.5 * temp1 * con42
            + 0.0625 * temp2 * (7.0 - 114.0 * cosio2 + 395.0 * cosio4)
            + temp3 * (3.0 - 36.0 * cosio2 + 49.0 * cosio4);
        let xhdot1 = -temp1 * cosio;
        let nodedot = xhdot1 + (0.5 * temp2 * (4.0 - 19.0 * cosio2) + 2.0 * temp3 * (3.0 - 7.0 * cosio2)) * cosio;

        let omgcof = bstar * cc3 * argpo.cos();
        let xmcof = if ecco > 1.0e-4 {
            -X2O3 * coef * bstar / eeta
        } else {
            0.0
        };
        let nodecf = 3.5 * omeosq * xhdot1 * cc1;
        let t2cof = 1.5 * cc1;

        // avoid a zero divide at 180 degrees inclination
        let xlcof_den = if (cosio + 1.0).abs() > 1.5e-12 {
            1.0 + cosio
        } else {
            1.5e-12
        };
        let xlcof = -0.25 * J3_OVER_J2 * sinio * (3.0 + 5.0 * cosio) / xlcof_den;
        let aycof = -0.5 * J3_OVER_J2 * sinio;
        let delmo = (1.0 + eta * mo.cos()).powi(3);
        let sinmao = mo.sin();
        let x7thm1 = 7.0 * cosio2 - 1.0;

        let (mut d2, mut d3, mut d4) = (0.0, 0.0, 0.0);
        let (mut t3cof, mut t4cof, mut t5cof) = (0.0, 0.0, 0.0);
        if !simple {
            let cc1sq = cc1 * cc1;
            d2 = 4.0 * ao * tsi * cc1sq;
            let temp = d2 * tsi * cc1 / 3.0;
            d3 = (17.0 * ao + sfour) * temp;
            d4 = 0.5 * temp * ao * tsi * (221.0 * ao + 31.0 * sfour) * cc1;
            t3cof = d2 + 2.0 * cc1sq;
            t4cof = 0.25 * (3.0 * d3 + cc1 * (12.0 * d2 + 10.0 * cc1sq));
            t5cof = 0.2 * (3.0 * d4 + 12.0 * cc1 * d3 + 6.0 * d2 * d2 + 15.0 * cc1sq * (2.0 * d2 + cc1sq));
        }

        Ok(Self {
            epoch: elements.epoch(),
            xke,
            bstar,
            ecco,
            inclo,
            nodeo,
            argpo,
            mo,
            no,
            mdot,
            argpdot,
            nodedot,
            nodecf,
            cc1,
            cc4,
            cc5,
            t2cof,
            t3cof,
            t4cof,
            t5cof,
            d2,
            d3,
            d4,
            omgcof,
            xmcof,
            eta,
            delmo,
            sinmao,
            con41,
            x1mth2,
            x7thm1,
            xlcof,
            aycof,
            simple,
        })
    }

    pub fn epoch(&self) -> DateTime<Utc> {
        self.epoch
    }

    /// Orbital period in minutes, from the recovered mean motion
    pub fn period_minutes(&self) -> f64 {
        TWO_PI / self.no
    }

    /// Propagate to an absolute instant.
    pub fn propagate_to(&self, at: DateTime<Utc>) -> Result<PropagatedState, PropagationError> {
        let delta = at - self.epoch;
        let minutes = match delta.num_nanoseconds() {
            Some(ns) => ns as f64 / 60.0e9,
            None => delta.num_milliseconds() as f64 / 60.0e3,
        };
        let (position, velocity) = self.state_at(minutes)?;
        Ok(PropagatedState {
            position,
            velocity,
            at,
            minutes_since_epoch: minutes,
        })
    }

    /// Propagate by `minutes` from the epoch; negative values go backwards.
    pub fn propagate(&self, minutes: f64) -> Result<PropagatedState, PropagationError> {
        let (position, velocity) = self.state_at(minutes)?;
        let at = self.epoch + TimeDelta::nanoseconds((minutes * 60.0e9).round() as i64);
        Ok(PropagatedState {
            position,
            velocity,
            at,
            minutes_since_epoch: minutes,
        })
    }

    fn state_at(&self, t: f64) -> Result<([f64; 3], [f64; 3]), PropagationError> {
        let decayed = |reason| PropagationError::DecayedOrbit {
            minutes_since_epoch: t,
            reason,
        };

        // secular gravity and drag
        let xmdf = self.mo + self.mdot * t;
        let argpdf = self.argpo + self.argpdot * t;
        let nodedf = self.nodeo + self.nodedot * t;
        let t2 = t * t;
        let mut argpm = argpdf;
        let mut mm = xmdf;
        let mut nodem = nodedf + self.nodecf * t2;
        let mut tempa = 1.0 - self.cc1 * t;
        let mut tempe = self.bstar * self.cc4 * t;
        let mut templ = self.t2cof * t2;

        if !self.simple {
            let delomg = self.omgcof * t;
            let delm = self.xmcof * ((1.0 + self.eta * xmdf.cos()).powi(3) - self.delmo);
            let temp = delomg + delm;
            mm = xmdf + temp;
            argpm = argpdf - temp;
            let t3 = t2 * t;
            let t4 = t3 * t;
            tempa = tempa - self.d2 * t2 - self.d3 * t3 - self.d4 * t4;
            tempe += self.bstar * self.cc5 * (mm.sin() - self.sinmao);
            templ += self.t3cof * t3 + t4 * (self.t4cof + t * self.t5cof);
        }

        let am = (self.xke / self.no).powf(X2O3) * tempa * tempa;
        let nm = self.xke / am.powf(1.5);
        let mut em = self.ecco - tempe;

        if !(em < 1.0 && em >= -0.001) {
            return Err(decayed(DecayReason::NonPhysicalEccentricity));
        }
        if !(am >= 0.95) {
            return Err(decayed(DecayReason::NonPhysicalSemiMajorAxis));
        }
        if !(nm > 0.0) {
            return Err(decayed(DecayReason::NonPositiveMeanMotion));
        }
        if em < 1.0e-6 {
            em = 1.0e-6;
        }

        mm += self.no * templ;
        let xlm = (mm + argpm + nodem) % TWO_PI;
        nodem %= TWO_PI;
        argpm %= TWO_PI;
        mm = (xlm - argpm - nodem) % TWO_PI;

        let inclm = self.inclo;
        let sinip = inclm.sin();
        let cosip = inclm.cos();

        // long period periodics
        let axnl = em * argpm.cos();
        let temp = 1.0 / (am * (1.0 - em * em));
        let aynl = em * argpm.sin() + temp * self.aycof;
        let xl = mm + argpm + nodem + temp * self.xlcof * axnl;

        // Kepler's equation in the equinoctial form
        let u = (xl - nodem) % TWO_PI;
        let mut eo1 = u;
        let mut sineo1 = eo1.sin();
        let mut coseo1 = eo1.cos();
        let mut step = f64::MAX;
        let mut iteration = 1;
        while step.abs() >= KEPLER_TOLERANCE && iteration <= KEPLER_MAX_ITERATIONS {
            sineo1 = eo1.sin();
            coseo1 = eo1.cos();
            step = (u - aynl * coseo1 + axnl * sineo1 - eo1) / (1.0 - coseo1 * axnl - sineo1 * aynl);
            step = step.clamp(-0.95, 0.95);
            eo1 += step;
            iteration += 1;
        }

        // short period preliminaries
        let ecose = axnl * coseo1 + aynl * sineo1;
        let esine = axnl * sineo1 - aynl * coseo1;
        let el2 = axnl * axnl + aynl * aynl;
        let pl = am * (1.0 - el2);
        if pl < 0.0 {
            return Err(decayed(DecayReason::NegativeSemiLatusRectum));
        }

        let rl = am * (1.0 - ecose);
        let rdotl = am.sqrt() * esine / rl;
        let rvdotl = pl.sqrt() / rl;
        let betal = (1.0 - el2).sqrt();
        let temp = esine / (1.0 + betal);
        let sinu = am / rl * (sineo1 - aynl - axnl * temp);
        let cosu = am / rl * (coseo1 - axnl + aynl * temp);
        let su = sinu.atan2(cosu);
        let sin2u = (cosu + cosu) * sinu;
        let cos2u = 1.0 - 2.0 * sinu * sinu;
        let temp = 1.0 / pl;
        let temp1 = 0.5 * J2 * temp;
        let temp2 = temp1 * temp;

        // short period periodics
        let mrt = rl * (1.0 - 1.5 * temp2 * betal * self.con41) + 0.5 * temp1 * self.x1mth2 * cos2u;
        let su = su - 0.25 * temp2 * self.x7thm1 * sin2u;
        let xnode = nodem + 1.5 * temp2 * cosip * sin2u;
        let xinc = inclm + 1.5 * temp2 * cosip * sinip * cos2u;
        let mvt = rdotl - nm * temp1 * self.x1mth2 * sin2u / self.xke;
        let rvdot = rvdotl + nm * temp1 * (self.x1mth2 * cos2u + 1.5 * self.con41) / self.xke;

        if !(mrt >= 1.0) {
            return Err(decayed(DecayReason::SubSurfaceRadius));
        }

        // orientation vectors
        let (sinsu, cossu) = su.sin_cos();
        let (snod, cnod) = xnode.sin_cos();
        let (sini, cosi) = xinc.sin_cos();
        let xmx = -snod * cosi;
        let xmy = cnod * cosi;
        let ux = xmx * sinsu + cnod * cossu;
        let uy = xmy * sinsu + snod * cossu;
        let uz = sini * sinsu;
        let vx = xmx * cossu - cnod * sinsu;
        let vy = xmy * cossu - snod * sinsu;
        let vz = sini * cossu;

        let r = mrt * EARTH_RADIUS_KM;
        let vkmpersec = EARTH_RADIUS_KM * self.xke / 60.0;
        let position = [r * ux, r * uy, r * uz];
        let velocity = [
            (mvt * ux + rvdot * vx) * vkmpersec,
            (mvt * uy + rvdot * vy) * vkmpersec,
            (mvt * uz + rvdot * vz) * vkmpersec,
        ];

        Ok((position, velocity))
    }
}
