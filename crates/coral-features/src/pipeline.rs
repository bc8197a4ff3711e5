//! The feature pipeline: raw price series to indicator-enriched rows.
//!
//! Each indicator is a pure function over the close/volume series producing
//! one `Option<f64>` per input row, `None` while the rolling or exponential
//! window has not yet seen enough history. [`enrich`] composes them in a
//! fixed order so the resulting column layout matches what the classifier
//! was trained on.

use coral_core::types::{FeatureRow, PricePoint};

const MACD_FAST: usize = 12;
const MACD_SLOW: usize = 26;
const MACD_SMOOTH: usize = 9;
const RSI_PERIOD: usize = 14;
const BOLLINGER_WINDOW: usize = 20;
const BOLLINGER_STD: f64 = 2.0;
const ROLLING_WINDOWS: [usize; 3] = [12, 36, 96];
const VWMA_WINDOWS: [usize; 3] = [4, 24, 96];
const TREND_DAY_HORIZONS: [usize; 3] = [1, 3, 7];
const TREND_SMOOTH: usize = 12;
/// Rows per day at the engine's hourly resample interval.
const ROWS_PER_DAY: usize = 24;

/// Enrich a price series with every indicator column, in pipeline order.
///
/// Output is aligned 1:1 with the input; deterministic and side-effect
/// free.
pub fn enrich(series: &[PricePoint]) -> Vec<FeatureRow> {
    let closes: Vec<f64> = series.iter().map(|p| p.close).collect();
    let volumes: Vec<f64> = series.iter().map(|p| p.volume).collect();

    let mut rows: Vec<FeatureRow> = series.iter().map(FeatureRow::from_price).collect();

    let (upper, lower, width, pct_b) = bollinger_bands(&closes, BOLLINGER_WINDOW, BOLLINGER_STD);
    let (macd, macd_signal, macd_hist) = macd(&closes, MACD_FAST, MACD_SLOW, MACD_SMOOTH);
    let rsi = rsi(&closes, RSI_PERIOD);

    for (i, row) in rows.iter_mut().enumerate() {
        row.bollinger_upper = upper[i];
        row.bollinger_lower = lower[i];
        row.bollinger_width = width[i];
        row.bollinger_pct_b = pct_b[i];
        row.macd = macd[i];
        row.macd_signal = macd_signal[i];
        row.macd_hist = macd_hist[i];
        row.rsi = rsi[i];
    }

    let [w12, w36, w96] = ROLLING_WINDOWS;
    let mean_12 = rolling_mean(&closes, w12);
    let std_12 = rolling_std(&closes, w12);
    let mean_36 = rolling_mean(&closes, w36);
    let std_36 = rolling_std(&closes, w36);
    let mean_96 = rolling_mean(&closes, w96);
    let std_96 = rolling_std(&closes, w96);

    let [v4, v24, v96] = VWMA_WINDOWS;
    let vwma_4 = vwma(&closes, &volumes, v4);
    let vwma_24 = vwma(&closes, &volumes, v24);
    let vwma_96 = vwma(&closes, &volumes, v96);

    let trend = trend_feature(&closes);

    for (i, row) in rows.iter_mut().enumerate() {
        row.rolling_mean_12h = mean_12[i];
        row.rolling_std_12h = std_12[i];
        row.rolling_mean_36h = mean_36[i];
        row.rolling_std_36h = std_36[i];
        row.rolling_mean_96h = mean_96[i];
        row.rolling_std_96h = std_96[i];
        row.vwma_4h = vwma_4[i];
        row.vwma_24h = vwma_24[i];
        row.vwma_96h = vwma_96[i];
        row.trend = trend[i];
    }

    rows
}

/// Exponentially weighted mean with `adjust=false` semantics: the weight of
/// the value `k` steps back is `(1-alpha)^k`. The recursion is seeded at the
/// first present value; output stays `None` until `min_periods` values have
/// been folded in.
fn ewm_mean(values: &[Option<f64>], alpha: f64, min_periods: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    let mut ema: Option<f64> = None;
    let mut count = 0usize;

    for (i, value) in values.iter().enumerate() {
        if let Some(x) = value {
            ema = Some(match ema {
                Some(prev) => alpha * x + (1.0 - alpha) * prev,
                None => *x,
            });
            count += 1;
        }
        if count >= min_periods {
            out[i] = ema;
        }
    }
    out
}

/// Rolling arithmetic mean over a fixed window; `None` until full.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }
    let mut sum: f64 = values[..window].iter().sum();
    out[window - 1] = Some(sum / window as f64);
    for i in window..values.len() {
        sum += values[i] - values[i - window];
        out[i] = Some(sum / window as f64);
    }
    out
}

/// Rolling sample standard deviation (n-1 denominator); `None` until full.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window < 2 || values.len() < window {
        return out;
    }
    for i in (window - 1)..values.len() {
        let slice = &values[i + 1 - window..=i];
        let mean = slice.iter().sum::<f64>() / window as f64;
        let var = slice.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (window as f64 - 1.0);
        out[i] = Some(var.sqrt());
    }
    out
}

/// MACD(fast, slow, smooth): line, signal and histogram columns.
pub fn macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    smooth: usize,
) -> (Vec<Option<f64>>, Vec<Option<f64>>, Vec<Option<f64>>) {
    let present: Vec<Option<f64>> = closes.iter().copied().map(Some).collect();
    let ema_fast = ewm_mean(&present, 2.0 / (fast as f64 + 1.0), fast);
    let ema_slow = ewm_mean(&present, 2.0 / (slow as f64 + 1.0), slow);

    let line: Vec<Option<f64>> = ema_fast
        .iter()
        .zip(ema_slow.iter())
        .map(|(f, s)| Some(f.as_ref()? - s.as_ref()?))
        .collect();

    let signal = ewm_mean(&line, 2.0 / (smooth as f64 + 1.0), smooth);

    let hist: Vec<Option<f64>> = line
        .iter()
        .zip(signal.iter())
        .map(|(m, s)| Some(m.as_ref()? - s.as_ref()?))
        .collect();

    (line, signal, hist)
}

/// RSI over close-to-close deltas, gains and losses each smoothed with
/// `alpha = 1/period`. Undefined (not 100) while the average loss is zero.
pub fn rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut gains: Vec<Option<f64>> = vec![None; closes.len()];
    let mut losses: Vec<Option<f64>> = vec![None; closes.len()];
    for i in 1..closes.len() {
        let delta = closes[i] - closes[i - 1];
        gains[i] = Some(delta.max(0.0));
        losses[i] = Some((-delta).max(0.0));
    }

    let alpha = 1.0 / period as f64;
    let avg_gain = ewm_mean(&gains, alpha, period);
    let avg_loss = ewm_mean(&losses, alpha, period);

    avg_gain
        .iter()
        .zip(avg_loss.iter())
        .map(|(gain, loss)| {
            let gain = (*gain)?;
            let loss = (*loss)?;
            if loss == 0.0 {
                None
            } else {
                Some(100.0 - 100.0 / (1.0 + gain / loss))
            }
        })
        .collect()
}

/// Bollinger Bands: upper, lower, width percent and %B columns.
pub fn bollinger_bands(
    closes: &[f64],
    window: usize,
    n_std: f64,
) -> (
    Vec<Option<f64>>,
    Vec<Option<f64>>,
    Vec<Option<f64>>,
    Vec<Option<f64>>,
) {
    let sma = rolling_mean(closes, window);
    let std = rolling_std(closes, window);

    let len = closes.len();
    let mut upper = vec![None; len];
    let mut lower = vec![None; len];
    let mut width = vec![None; len];
    let mut pct_b = vec![None; len];

    for i in 0..len {
        let (Some(mean), Some(sd)) = (sma[i], std[i]) else {
            continue;
        };
        let up = mean + n_std * sd;
        let lo = mean - n_std * sd;
        upper[i] = Some(up);
        lower[i] = Some(lo);
        if mean != 0.0 {
            width[i] = Some((up - lo) / mean * 100.0);
        }
        // %B is undefined on a flat band.
        if up != lo {
            pct_b[i] = Some((closes[i] - lo) / (up - lo));
        }
    }

    (upper, lower, width, pct_b)
}

/// Volume-weighted moving average: sum(close*volume) / sum(volume) per
/// window. `None` while the window is short or traded volume is zero.
pub fn vwma(closes: &[f64], volumes: &[f64], window: usize) -> Vec<Option<f64>> {
    let len = closes.len().min(volumes.len());
    let mut out = vec![None; len];
    if window == 0 || len < window {
        return out;
    }
    let mut pv_sum: f64 = (0..window).map(|i| closes[i] * volumes[i]).sum();
    let mut v_sum: f64 = volumes[..window].iter().sum();
    for i in (window - 1)..len {
        if i >= window {
            pv_sum += closes[i] * volumes[i] - closes[i - window] * volumes[i - window];
            v_sum += volumes[i] - volumes[i - window];
        }
        if v_sum != 0.0 {
            out[i] = Some(pv_sum / v_sum);
        }
    }
    out
}

/// Multi-day price-difference trend feature.
///
/// For each horizon of 1/3/7 days, take close minus the close at the same
/// hour of day that many days earlier, average the three differences,
/// divide by the current close, then smooth with a 12-period rolling mean.
pub fn trend_feature(closes: &[f64]) -> Vec<Option<f64>> {
    let len = closes.len();
    let mut relative: Vec<Option<f64>> = vec![None; len];

    let max_lag = TREND_DAY_HORIZONS
        .iter()
        .map(|d| d * ROWS_PER_DAY)
        .max()
        .unwrap_or(0);

    for i in 0..len {
        if i < max_lag || closes[i] == 0.0 {
            continue;
        }
        let sum: f64 = TREND_DAY_HORIZONS
            .iter()
            .map(|d| closes[i] - closes[i - d * ROWS_PER_DAY])
            .sum();
        relative[i] = Some(sum / TREND_DAY_HORIZONS.len() as f64 / closes[i]);
    }

    rolling_mean_opt(&relative, TREND_SMOOTH)
}

/// Rolling mean over an optional series: defined only where the whole
/// window is present.
fn rolling_mean_opt(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }
    for i in (window - 1)..values.len() {
        let slice = &values[i + 1 - window..=i];
        if slice.iter().all(Option::is_some) {
            let sum: f64 = slice.iter().flatten().sum();
            out[i] = Some(sum / window as f64);
        }
    }
    out
}

/// True exactly at rows where the MACD line crosses its signal line from
/// below to above between the previous row and this one.
pub fn macd_buy_signal(rows: &[FeatureRow]) -> Vec<bool> {
    crossover(rows, |curr_macd, curr_sig, prev_macd, prev_sig| {
        curr_macd > curr_sig && prev_macd < prev_sig
    })
}

/// True exactly at rows where the MACD line crosses its signal line from
/// above to below.
pub fn macd_sell_signal(rows: &[FeatureRow]) -> Vec<bool> {
    crossover(rows, |curr_macd, curr_sig, prev_macd, prev_sig| {
        curr_macd < curr_sig && prev_macd > prev_sig
    })
}

fn crossover<F>(rows: &[FeatureRow], pred: F) -> Vec<bool>
where
    F: Fn(f64, f64, f64, f64) -> bool,
{
    let mut out = vec![false; rows.len()];
    for i in 1..rows.len() {
        let (Some(cm), Some(cs), Some(pm), Some(ps)) = (
            rows[i].macd,
            rows[i].macd_signal,
            rows[i - 1].macd,
            rows[i - 1].macd_signal,
        ) else {
            continue;
        };
        out[i] = pred(cm, cs, pm, ps);
    }
    out
}
