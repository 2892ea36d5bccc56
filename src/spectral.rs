//! Per-texel kernels of the spectral wave pipeline.
//!
//! Every GPU pass is a pure function of texel position and uniforms; this
//! module holds those functions in plain Rust, mirrored one-to-one by the
//! WGSL in `src/shaders/`. The kernels are the single source of truth for
//! the math, and the `Mirror` pipeline at the bottom runs them over CPU
//! fields so the numeric invariants can be tested without a GPU.
//!
//! Conventions:
//! - Spectra are stored in standard FFT order: DC at texel (0, 0), signed
//!   index wrapping from [0, N/2) to [-N/2, 0) at the Nyquist boundary.
//! - Each texel is a vec4: one complex pair in RG, a second in BA. The
//!   height spectrum rides in RG, the chop (horizontal displacement)
//!   spectrum in BA, so both share the same butterfly passes.
//! - The inverse transform carries 1/N per axis, folded as 0.5 into every
//!   butterfly stage.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use num_complex::Complex32;

use crate::params::{SimulationParams, G};
use crate::simulation::fft::FftPlan;

/// Signed frequency index for texel `i` on an `n`-wide grid.
///
/// Wraps from [0, n/2) to [-n/2, 0) at the Nyquist boundary.
pub fn signed_index(i: u32, n: u32) -> i32 {
    if i < n / 2 {
        i as i32
    } else {
        i as i32 - n as i32
    }
}

/// Texel index holding the wavenumber -k for the texel holding k.
pub fn mirror_index(i: u32, n: u32) -> u32 {
    (n - i) % n
}

/// Wavenumber at texel (i, j): k = 2*pi * signed_index / scale, per axis.
///
/// The lattice is implicit; both this function and the shaders recompute it
/// per texel rather than materializing a buffer.
pub fn wavenumber(i: u32, j: u32, n: u32, scale: f32) -> Vec2 {
    Vec2::new(
        TAU * signed_index(i, n) as f32 / scale,
        TAU * signed_index(j, n) as f32 / scale,
    )
}

/// Texel-center position in [-1, 1], the coordinate fed to the hash.
pub fn texel_pos(i: u32, j: u32, n: u32) -> Vec2 {
    Vec2::new(
        (i as f32 + 0.5) / n as f32 * 2.0 - 1.0,
        (j as f32 + 0.5) / n as f32 * 2.0 - 1.0,
    )
}

/// Deterministic lattice hash, uniform-ish on [0.5, 1).
pub fn lattice_hash(p: Vec2) -> f32 {
    let s = (p.dot(Vec2::new(12.9898, 78.233))).sin() * 43758.5453123;
    (s - s.floor()) * 0.5 + 0.5
}

/// Box-Muller transform of two uniform draws.
///
/// `u` = 0 would send `ln` to -inf; the kernel substitutes a fixed fallback
/// instead, an expected condition of the hash, not an error.
pub fn gaussian(u: f32, v: f32) -> f32 {
    let u = if u == 0.0 { 0.33 } else { u };
    (-2.0 * u.ln()).sqrt() * (TAU * v).cos()
}

/// Unit-Gaussian draw at a hashed lattice position.
pub fn gaussian_at(p: Vec2) -> f32 {
    gaussian(1.0 - lattice_hash(p), lattice_hash(p))
}

/// Phillips spectrum amplitude for wavenumber `k` under wind `wind`.
///
/// Zero at k = 0 (the DC singularity carries no wave energy). The cutoff
/// term suppresses wavelengths shorter than `cutoff` meters.
pub fn phillips(k: Vec2, wind: Vec2, cutoff: f32) -> f32 {
    let k_sq = k.length_squared();
    if k_sq <= 0.0 {
        return 0.0;
    }
    let w_sq = wind.length_squared();
    (-G * G / k_sq / (w_sq * w_sq) / 2.0).exp() / k_sq
        * k.normalize().dot(wind.normalize()).abs()
        / 2.0_f32.powf(0.25)
        * (-cutoff * cutoff * k_sq / 2.0).exp()
}

/// Initial complex amplitude H0(k) at texel (i, j).
pub fn initial_amplitude(i: u32, j: u32, params: &SimulationParams) -> Complex32 {
    let n = params.modes;
    let k = wavenumber(i, j, n, params.scale);
    let wind = Vec2::new(params.wind_x, params.wind_y);
    let p = phillips(k, wind, params.cutoff) * params.spectrum_amplitude();
    let pos = texel_pos(i, j, n);
    let seed = Vec2::from_array(params.seed);
    Complex32::new(
        p * gaussian_at(pos - seed),
        p * gaussian_at(pos + seed),
    )
}

/// Per-texel random phase mixed into the symmetrized amplitudes.
fn variety_phase(i: u32, j: u32, n: u32) -> Complex32 {
    let ang = PI * lattice_hash(texel_pos(i, j, n));
    Complex32::new(ang.cos(), ang.sin())
}

/// Symmetrizer: packs (hp, hm) for texel (i, j) from the H0 field.
///
/// hp = H0(k)/2 * phi(k), hm = H0(-k)/2 * phi(-k), where phi is a random
/// phase for variety. Applying phi consistently on both halves preserves
/// the conjugate symmetry the time evolution relies on: for every k,
/// H(-k, t) = conj(H(k, t)), which forces the inverse transform's
/// imaginary part to vanish.
pub fn symmetrized_pair<F>(h0: F, i: u32, j: u32, n: u32) -> (Complex32, Complex32)
where
    F: Fn(u32, u32) -> Complex32,
{
    let (mi, mj) = (mirror_index(i, n), mirror_index(j, n));
    let hp = h0(i, j) * 0.5 * variety_phase(i, j, n);
    let hm = h0(mi, mj) * 0.5 * variety_phase(mi, mj, n);
    (hp, hm)
}

/// Time evolution of one frequency bin.
///
/// H(k, t) = hp * e^{i w t} + conj(hm) * e^{-i w t} with the deep-water
/// dispersion relation w = sqrt(g |k|). The chop spectrum is the
/// 90-degree-rotated, direction-weighted companion
/// dis = chop * (i * khat_x * H + khat_y * H).
/// Both are forced to exactly zero at k = (0, 0), where the direction is
/// undefined.
pub fn evolve(hp: Complex32, hm: Complex32, k: Vec2, t: f32, chop: f32) -> (Complex32, Complex32) {
    let k_len = k.length();
    if k_len == 0.0 {
        return (Complex32::new(0.0, 0.0), Complex32::new(0.0, 0.0));
    }
    let wt = (G * k_len).sqrt() * t;
    let phase = Complex32::new(wt.cos(), wt.sin());
    let h = hp * phase + hm.conj() * phase.conj();
    let k_hat = k / k_len;
    let dis = Complex32::new(0.0, k_hat.x) * h + Complex32::new(k_hat.y, 0.0) * h;
    (h, dis * chop)
}

/// Butterfly partner indices for output element `idx` of a stage with
/// sub-transform size `sub` on an `n`-point axis (Stockham gather form;
/// no bit-reversal permutation is needed).
pub fn butterfly_indices(idx: u32, n: u32, sub: u32) -> (u32, u32) {
    let even = (idx / sub) * (sub / 2) + idx % (sub / 2);
    (even, even + n / 2)
}

/// Inverse-transform twiddle factor e^{+2 pi i idx / sub}.
pub fn butterfly_twiddle(idx: u32, sub: u32) -> Complex32 {
    let arg = TAU * (idx % sub) as f32 / sub as f32;
    Complex32::new(arg.cos(), arg.sin())
}

/// An N x N grid of vec4 texels, the CPU counterpart of one simulation
/// texture: complex pair in RG, second complex pair in BA.
#[derive(Clone, PartialEq)]
pub struct Field {
    pub n: u32,
    pub texels: Vec<[f32; 4]>,
}

impl Field {
    pub fn zeroed(n: u32) -> Self {
        Self {
            n,
            texels: vec![[0.0; 4]; (n * n) as usize],
        }
    }

    pub fn at(&self, i: u32, j: u32) -> [f32; 4] {
        self.texels[(j * self.n + i) as usize]
    }

    pub fn set(&mut self, i: u32, j: u32, v: [f32; 4]) {
        self.texels[(j * self.n + i) as usize] = v;
    }

    /// RG channels as a complex value.
    pub fn rg(&self, i: u32, j: u32) -> Complex32 {
        let t = self.at(i, j);
        Complex32::new(t[0], t[1])
    }

    /// BA channels as a complex value.
    pub fn ba(&self, i: u32, j: u32) -> Complex32 {
        let t = self.at(i, j);
        Complex32::new(t[2], t[3])
    }
}

/// Run the initial-spectrum kernel over a full grid.
pub fn initial_field(params: &SimulationParams) -> Field {
    let n = params.modes;
    let mut field = Field::zeroed(n);
    for j in 0..n {
        for i in 0..n {
            let h0 = initial_amplitude(i, j, params);
            field.set(i, j, [h0.re, h0.im, 0.0, 0.0]);
        }
    }
    field
}

/// Run the symmetrizer kernel over a full grid: hp in RG, hm in BA.
pub fn symmetrized_field(h0: &Field, params: &SimulationParams) -> Field {
    let n = params.modes;
    let mut field = Field::zeroed(n);
    for j in 0..n {
        for i in 0..n {
            let (hp, hm) = symmetrized_pair(|x, y| h0.rg(x, y), i, j, n);
            field.set(i, j, [hp.re, hp.im, hm.re, hm.im]);
        }
    }
    field
}

/// Run the time-evolution kernel over a full grid: H in RG, chop in BA.
pub fn evolved_field(amplitudes: &Field, params: &SimulationParams, t: f32) -> Field {
    let n = params.modes;
    let mut field = Field::zeroed(n);
    for j in 0..n {
        for i in 0..n {
            let k = wavenumber(i, j, n, params.scale);
            let (h, dis) = evolve(amplitudes.rg(i, j), amplitudes.ba(i, j), k, t, params.chopping);
            field.set(i, j, [h.re, h.im, dis.re, dis.im]);
        }
    }
    field
}

/// 2D inverse FFT over a field, stage-for-stage identical to the GPU
/// butterfly passes (RG and BA pairs transformed together).
pub fn ifft2d(input: &Field, plan: &FftPlan) -> Field {
    let n = input.n;
    let mut src = input.clone();
    let mut dst = Field::zeroed(n);

    for stage in plan.stages() {
        for j in 0..n {
            for i in 0..n {
                let (idx, jx) = if stage.horizontal { (i, j) } else { (j, i) };
                let (even_ix, odd_ix) = butterfly_indices(idx, n, stage.sub_size);
                let (even, odd) = if stage.horizontal {
                    (src.at(even_ix, jx), src.at(odd_ix, jx))
                } else {
                    (src.at(jx, even_ix), src.at(jx, odd_ix))
                };
                let tw = butterfly_twiddle(idx, stage.sub_size);
                let rg = (Complex32::new(even[0], even[1])
                    + tw * Complex32::new(odd[0], odd[1]))
                    * 0.5;
                let ba = (Complex32::new(even[2], even[3])
                    + tw * Complex32::new(odd[2], odd[3]))
                    * 0.5;
                dst.set(i, j, [rg.re, rg.im, ba.re, ba.im]);
            }
        }
        std::mem::swap(&mut src, &mut dst);
    }
    src
}

/// CPU counterpart of the GPU `OceanSimulation`: caches the persistent
/// symmetrized spectrum, rebuilt only when the parameter version changes.
pub struct Mirror {
    amplitudes: Field,
    plan: FftPlan,
    built_version: u64,
}

impl Mirror {
    pub fn new(params: &SimulationParams) -> anyhow::Result<Self> {
        params.validate()?;
        let plan = FftPlan::new(params.modes)?;
        let amplitudes = symmetrized_field(&initial_field(params), params);
        Ok(Self {
            amplitudes,
            plan,
            built_version: params.version(),
        })
    }

    /// Rebuild the persistent spectrum if `params` changed since the last
    /// build. Returns whether a rebuild happened.
    pub fn reinitialize(&mut self, params: &SimulationParams) -> anyhow::Result<bool> {
        if params.version() == self.built_version {
            return Ok(false);
        }
        params.validate()?;
        self.plan = FftPlan::new(params.modes)?;
        self.amplitudes = symmetrized_field(&initial_field(params), params);
        self.built_version = params.version();
        Ok(true)
    }

    /// The persistent symmetrized spectrum (hp in RG, hm in BA).
    pub fn amplitudes(&self) -> &Field {
        &self.amplitudes
    }

    /// Evolve to time `t` and inverse-transform: height (re, im) in RG,
    /// horizontal displacement in BA.
    pub fn advance(&self, params: &SimulationParams, t: f32) -> Field {
        ifft2d(&evolved_field(&self.amplitudes, params, t), &self.plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustfft::FftPlanner;

    fn small_params(modes: u32) -> SimulationParams {
        let mut params = SimulationParams::default();
        params.modes = modes;
        params.scale = 10.0;
        params.wind_x = 9.0;
        params.wind_y = 3.0;
        params.cutoff = 0.5;
        params
    }

    #[test]
    fn test_signed_index_wraps_at_nyquist() {
        assert_eq!(signed_index(0, 16), 0);
        assert_eq!(signed_index(7, 16), 7);
        assert_eq!(signed_index(8, 16), -8);
        assert_eq!(signed_index(15, 16), -1);
    }

    #[test]
    fn test_mirror_index_is_an_involution() {
        let n = 16;
        for i in 0..n {
            assert_eq!(mirror_index(mirror_index(i, n), n), i);
            assert_eq!(
                signed_index(mirror_index(i, n), n),
                if i == n / 2 {
                    // Nyquist bin is its own mirror
                    signed_index(i, n)
                } else {
                    -signed_index(i, n)
                }
            );
        }
    }

    #[test]
    fn test_lattice_hash_in_unit_range() {
        for j in 0..64 {
            for i in 0..64 {
                let h = lattice_hash(texel_pos(i, j, 64));
                assert!((0.0..1.0).contains(&h), "hash out of range: {}", h);
            }
        }
    }

    #[test]
    fn test_gaussian_zero_input_is_finite() {
        // u = 0 would be log(0); the kernel substitutes instead of NaN/Inf
        assert!(gaussian(0.0, 0.25).is_finite());
        assert!(gaussian(0.0, 0.0).is_finite());
    }

    #[test]
    fn test_phillips_zero_at_dc() {
        assert_eq!(phillips(Vec2::ZERO, Vec2::new(9.0, 3.0), 0.5), 0.0);
    }

    #[test]
    fn test_phillips_favors_wind_aligned_waves() {
        let wind = Vec2::new(10.0, 0.0);
        let along = phillips(Vec2::new(1.0, 0.0), wind, 0.0);
        let across = phillips(Vec2::new(0.0, 1.0), wind, 0.0);
        assert!(along > across);
        // perpendicular waves carry exactly zero energy in this model
        assert_eq!(across, 0.0);
    }

    #[test]
    fn test_symmetry_invariant_after_evolution() {
        // For all k: H(-k, t) == conj(H(k, t)), at every t
        let params = small_params(16);
        let amps = symmetrized_field(&initial_field(&params), &params);
        for &t in &[0.0, 1.7, 13.3] {
            let evolved = evolved_field(&amps, &params, t);
            let n = params.modes;
            for j in 0..n {
                for i in 0..n {
                    let h = evolved.rg(i, j);
                    let h_neg = evolved.rg(mirror_index(i, n), mirror_index(j, n));
                    assert!(
                        (h_neg - h.conj()).norm() < 1e-5,
                        "symmetry broken at ({}, {}), t = {}: {} vs conj {}",
                        i,
                        j,
                        t,
                        h_neg,
                        h
                    );
                }
            }
        }
    }

    #[test]
    fn test_zero_wavenumber_bin_is_exactly_zero() {
        let params = small_params(16);
        let amps = symmetrized_field(&initial_field(&params), &params);
        for &t in &[0.0, 0.5, 100.0] {
            let evolved = evolved_field(&amps, &params, t);
            assert_eq!(evolved.at(0, 0), [0.0; 4]);
        }
    }

    #[test]
    fn test_height_field_is_real() {
        // Hermitian input forces the imaginary channel of the inverse
        // transform to vanish
        let params = small_params(16);
        let mirror = Mirror::new(&params).unwrap();
        let spatial = mirror.advance(&params, 2.0);

        let mut max_re = 0.0f32;
        let mut max_im = 0.0f32;
        for t in &spatial.texels {
            max_re = max_re.max(t[0].abs());
            max_im = max_im.max(t[1].abs());
        }
        assert!(max_re > 0.0, "height field must not be identically zero");
        assert!(
            max_im < 1e-4 * max_re,
            "imaginary residue {} too large relative to {}",
            max_im,
            max_re
        );
    }

    /// Reference 2D forward DFT via rustfft (rows, then columns).
    fn forward_dft_2d(data: &mut Vec<Complex32>, n: usize) {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(n);
        // rows
        for row in data.chunks_mut(n) {
            fft.process(row);
        }
        // columns
        let mut col = vec![Complex32::new(0.0, 0.0); n];
        for x in 0..n {
            for y in 0..n {
                col[y] = data[y * n + x];
            }
            fft.process(&mut col);
            for y in 0..n {
                data[y * n + x] = col[y];
            }
        }
    }

    #[test]
    fn test_fft_round_trip_against_reference() {
        for &n in &[16u32, 64, 256] {
            let plan = FftPlan::new(n).unwrap();
            let len = (n * n) as usize;

            // two independent deterministic complex fields, one per channel
            // pair (exercises the packed RG/BA butterfly path)
            let mut state = 0x2545f491u32;
            let mut rand = move || {
                state = state.wrapping_mul(1664525).wrapping_add(1013904223);
                (state >> 8) as f32 / (1u32 << 24) as f32 - 0.5
            };
            let original_rg: Vec<Complex32> =
                (0..len).map(|_| Complex32::new(rand(), rand())).collect();
            let original_ba: Vec<Complex32> =
                (0..len).map(|_| Complex32::new(rand(), rand())).collect();

            let mut spectrum_rg = original_rg.clone();
            let mut spectrum_ba = original_ba.clone();
            forward_dft_2d(&mut spectrum_rg, n as usize);
            forward_dft_2d(&mut spectrum_ba, n as usize);

            let mut field = Field::zeroed(n);
            for idx in 0..len {
                field.texels[idx] = [
                    spectrum_rg[idx].re,
                    spectrum_rg[idx].im,
                    spectrum_ba[idx].re,
                    spectrum_ba[idx].im,
                ];
            }

            let restored = ifft2d(&field, &plan);
            let mut worst = 0.0f32;
            for idx in 0..len {
                let rg = Complex32::new(restored.texels[idx][0], restored.texels[idx][1]);
                let ba = Complex32::new(restored.texels[idx][2], restored.texels[idx][3]);
                worst = worst.max((rg - original_rg[idx]).norm());
                worst = worst.max((ba - original_ba[idx]).norm());
            }
            assert!(worst < 1e-3, "round-trip error {} at n = {}", worst, n);
        }
    }

    #[test]
    fn test_determinism_from_fresh_initialization() {
        let params = small_params(16);
        let a = Mirror::new(&params).unwrap().advance(&params, 3.7);
        let b = Mirror::new(&params).unwrap().advance(&params, 3.7);
        for (x, y) in a.texels.iter().zip(b.texels.iter()) {
            for c in 0..4 {
                assert_eq!(x[c].to_bits(), y[c].to_bits(), "output must be bit-identical");
            }
        }
    }

    #[test]
    fn test_scenario_bounded_height_and_periodic_bins() {
        // N = 16, scale = (10, 10), wind = (9, 3), cutoff = 0.5
        let params = small_params(16);
        let n = params.modes;
        let mirror = Mirror::new(&params).unwrap();

        // |h(x, t)| <= (1/N^2) * sum_k (|hp| + |hm|), for every t
        let amps = mirror.amplitudes();
        let mut bound = 0.0f32;
        for j in 0..n {
            for i in 0..n {
                bound += amps.rg(i, j).norm() + amps.ba(i, j).norm();
            }
        }
        bound /= (n * n) as f32;

        for &t in &[0.0, 1.0, 10.0] {
            let spatial = mirror.advance(&params, t);
            let max_h = spatial
                .texels
                .iter()
                .fold(0.0f32, |acc, texel| acc.max(texel[0].abs()));
            assert!(max_h.is_finite());
            assert!(
                max_h <= bound * (1.0 + 1e-3),
                "height {} exceeds spectral bound {} at t = {}",
                max_h,
                bound,
                t
            );
        }

        // the lowest non-zero wavenumber returns to its value after one
        // dispersion period T = 2*pi / omega(k_min)
        let k_min = wavenumber(1, 0, n, params.scale);
        let period = TAU / (G * k_min.length()).sqrt();
        let t0 = 1.0;
        let before = evolved_field(mirror.amplitudes(), &params, t0);
        let after = evolved_field(mirror.amplitudes(), &params, t0 + period);
        for (i, j) in [(1, 0), (0, 1), (n - 1, 0), (0, n - 1)] {
            let delta = (after.rg(i, j) - before.rg(i, j)).norm();
            assert!(
                delta < 1e-3,
                "bin ({}, {}) did not return after one period: delta = {}",
                i,
                j,
                delta
            );
        }
    }

    #[test]
    fn test_resolution_change_matches_cold_start() {
        // switching 256 -> 512 and re-initializing must leave no residue of
        // the old resolution
        let mut params = small_params(256);
        let mut mirror = Mirror::new(&params).unwrap();

        params.modes = 512;
        params.bump();
        assert!(mirror.reinitialize(&params).unwrap());

        let cold = Mirror::new(&params).unwrap();
        assert_eq!(mirror.amplitudes().n, 512);
        assert!(
            mirror.amplitudes() == cold.amplitudes(),
            "rebuilt spectrum must be identical to a cold start"
        );
    }

    #[test]
    fn test_reinitialize_is_gated_by_version() {
        let params = small_params(16);
        let mut mirror = Mirror::new(&params).unwrap();
        assert!(!mirror.reinitialize(&params).unwrap(), "same version, no rebuild");
    }
}
