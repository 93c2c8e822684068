use super::types::TaxBreakdownItem;

/// EUR per GBP, fixed for modelling.
const GBP_EUR_RATE: f64 = 1.17;

const UK_PERSONAL_ALLOWANCE: f64 = 12_570.0;
const UK_INCOME_TAX_BANDS: [Band; 3] = [
    Band::new(UK_PERSONAL_ALLOWANCE, 50_270.0, 0.20),
    Band::new(50_270.0, 125_140.0, 0.40),
    Band::open(125_140.0, 0.45),
];
const UK_NATIONAL_INSURANCE_RATE: f64 = 0.08;

const DE_INCOME_TAX_BANDS: [Band; 3] = [
    Band::new(11_604.0, 66_760.0, 0.24),
    Band::new(66_760.0, 277_825.0, 0.42),
    Band::open(277_825.0, 0.45),
];
const DE_SOCIAL_SECURITY_RATE: f64 = 0.20;

const NL_TAXABLE_SHARE: f64 = 0.70;
const NL_INCOME_TAX_BANDS: [Band; 2] = [
    Band::new(0.0, 75_518.0, 0.3697),
    Band::open(75_518.0, 0.4950),
];

const ES_FLAT_RATE: f64 = 0.24;

const PL_FLAT_RATE: f64 = 0.12;
const PL_ANNUAL_SOCIAL_CONTRIBUTION: f64 = 6_000.0;

const DEFAULT_EFFECTIVE_RATE: f64 = 0.35;
const DEFAULT_RETAINED_SHARE: f64 = 0.65;

/// Largest monthly gross the engine assesses. Twelve months of it stay finite,
/// so band arithmetic never sees `inf - inf`.
const MAX_MONTHLY_GROSS: f64 = f64::MAX / 16.0;

/// One slice of a progressive schedule, taxed at `rate` between `from` and `to`.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Band {
    from: f64,
    to: f64,
    rate: f64,
}

impl Band {
    const fn new(from: f64, to: f64, rate: f64) -> Self {
        Self { from, to, rate }
    }

    const fn open(from: f64, rate: f64) -> Self {
        Self {
            from,
            to: f64::INFINITY,
            rate,
        }
    }
}

fn banded_tax(income: f64, bands: &[Band]) -> f64 {
    let mut tax = 0.0;
    for band in bands {
        if income > band.from {
            tax += (income.min(band.to) - band.from) * band.rate;
        }
    }
    tax
}

/// Tax regime selected by city name.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Jurisdiction {
    UnitedKingdom,
    Germany,
    Netherlands,
    Spain,
    Poland,
    EuropeanAverage,
}

impl Jurisdiction {
    /// Case-insensitive, whitespace-trimmed lookup; anything unlisted uses the
    /// European average.
    pub fn for_city(city_name: &str) -> Self {
        match city_name.trim().to_lowercase().as_str() {
            "london" => Jurisdiction::UnitedKingdom,
            "berlin" | "munich" => Jurisdiction::Germany,
            "amsterdam" => Jurisdiction::Netherlands,
            "madrid" | "barcelona" => Jurisdiction::Spain,
            "warsaw" => Jurisdiction::Poland,
            _ => Jurisdiction::EuropeanAverage,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Jurisdiction::UnitedKingdom => "united-kingdom",
            Jurisdiction::Germany => "germany",
            Jurisdiction::Netherlands => "netherlands",
            Jurisdiction::Spain => "spain",
            Jurisdiction::Poland => "poland",
            Jurisdiction::EuropeanAverage => "european-average",
        }
    }

    fn assess(self, annual_gross: f64) -> Assessment {
        match self {
            Jurisdiction::UnitedKingdom => {
                let gross_gbp = annual_gross / GBP_EUR_RATE;
                let income_tax_gbp = banded_tax(gross_gbp, &UK_INCOME_TAX_BANDS);
                let ni_gbp = if gross_gbp > UK_PERSONAL_ALLOWANCE {
                    (gross_gbp - UK_PERSONAL_ALLOWANCE) * UK_NATIONAL_INSURANCE_RATE
                } else {
                    0.0
                };
                let net_gbp = gross_gbp - income_tax_gbp - ni_gbp;
                Assessment {
                    annual_net: net_gbp * GBP_EUR_RATE,
                    deductions: vec![
                        Deduction::charged("UK Income Tax", income_tax_gbp * GBP_EUR_RATE),
                        Deduction::charged("National Insurance", ni_gbp * GBP_EUR_RATE),
                    ],
                }
            }
            Jurisdiction::Germany => {
                let income_tax = banded_tax(annual_gross, &DE_INCOME_TAX_BANDS);
                let social = annual_gross * DE_SOCIAL_SECURITY_RATE;
                Assessment {
                    annual_net: annual_gross - income_tax - social,
                    deductions: vec![
                        Deduction::charged("German Income Tax", income_tax),
                        Deduction::charged("Social Security", social),
                    ],
                }
            }
            Jurisdiction::Netherlands => {
                // The remaining 30% is never taxed.
                let taxable = annual_gross * NL_TAXABLE_SHARE;
                let income_tax = banded_tax(taxable, &NL_INCOME_TAX_BANDS);
                Assessment {
                    annual_net: annual_gross - income_tax,
                    deductions: vec![
                        Deduction::informational("30% Ruling Benefit"),
                        Deduction::charged("Dutch Income Tax", income_tax),
                    ],
                }
            }
            Jurisdiction::Spain => {
                let income_tax = annual_gross * ES_FLAT_RATE;
                Assessment {
                    annual_net: annual_gross - income_tax,
                    deductions: vec![Deduction::charged("Beckham Law Tax (Flat 24%)", income_tax)],
                }
            }
            Jurisdiction::Poland => {
                let income_tax = annual_gross * PL_FLAT_RATE;
                Assessment {
                    annual_net: annual_gross - income_tax - PL_ANNUAL_SOCIAL_CONTRIBUTION,
                    deductions: vec![
                        Deduction::charged("B2B Flat Income Tax", income_tax),
                        Deduction::charged("ZUS & Health Contrib.", PL_ANNUAL_SOCIAL_CONTRIBUTION),
                    ],
                }
            }
            Jurisdiction::EuropeanAverage => Assessment {
                annual_net: annual_gross * DEFAULT_RETAINED_SHARE,
                deductions: vec![Deduction::charged(
                    "Estimated Euro Tax",
                    annual_gross * DEFAULT_EFFECTIVE_RATE,
                )],
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Deduction {
    label: &'static str,
    annual_eur: f64,
    informational: bool,
}

impl Deduction {
    fn charged(label: &'static str, annual_eur: f64) -> Self {
        Self {
            label,
            annual_eur,
            informational: false,
        }
    }

    fn informational(label: &'static str) -> Self {
        Self {
            label,
            annual_eur: 0.0,
            informational: true,
        }
    }
}

#[derive(Debug, Clone)]
struct Assessment {
    annual_net: f64,
    deductions: Vec<Deduction>,
}

/// Negative gross clamps to zero; NaN and infinities are treated as no income.
/// Anything above `MAX_MONTHLY_GROSS` is assessed at the cap.
fn sanitize_gross(monthly_gross: f64) -> f64 {
    if monthly_gross.is_finite() {
        monthly_gross.clamp(0.0, MAX_MONTHLY_GROSS)
    } else {
        0.0
    }
}

fn round_monthly(annual: f64) -> u64 {
    (annual / 12.0).max(0.0).round() as u64
}

/// Monthly take-home pay in whole EUR for a monthly gross salary in `city_name`.
///
/// Never negative: fixed deductions larger than income floor the result at 0.
pub fn net_salary(monthly_gross: f64, city_name: &str) -> u64 {
    let annual_gross = sanitize_gross(monthly_gross) * 12.0;
    let assessment = Jurisdiction::for_city(city_name).assess(annual_gross);
    round_monthly(assessment.annual_net)
}

/// Itemised monthly deductions, in display order.
///
/// Each item is rounded on its own, so the amounts need not add up exactly to
/// `gross - net_salary(gross)`.
pub fn tax_breakdown(monthly_gross: f64, city_name: &str) -> Vec<TaxBreakdownItem> {
    let annual_gross = sanitize_gross(monthly_gross) * 12.0;
    Jurisdiction::for_city(city_name)
        .assess(annual_gross)
        .deductions
        .into_iter()
        .filter(|d| d.informational || d.annual_eur > 0.0)
        .map(|d| TaxBreakdownItem {
            label: d.label,
            amount: round_monthly(d.annual_eur),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, prop_assume, proptest};

    const NAMED_CITIES: [&str; 8] = [
        "London",
        "Berlin",
        "Munich",
        "Amsterdam",
        "Madrid",
        "Barcelona",
        "Warsaw",
        "Lisbon",
    ];

    fn labels(items: &[TaxBreakdownItem]) -> Vec<&'static str> {
        items.iter().map(|i| i.label).collect()
    }

    #[test]
    fn city_lookup_ignores_case_and_surrounding_whitespace() {
        assert_eq!(Jurisdiction::for_city("  LONDON "), Jurisdiction::UnitedKingdom);
        assert_eq!(Jurisdiction::for_city("munich"), Jurisdiction::Germany);
        assert_eq!(Jurisdiction::for_city("BarceLona"), Jurisdiction::Spain);
        assert_eq!(Jurisdiction::for_city("Paris"), Jurisdiction::EuropeanAverage);
        assert_eq!(Jurisdiction::for_city(""), Jurisdiction::EuropeanAverage);
    }

    #[test]
    fn oracle_london_applies_bands_and_national_insurance_in_gbp() {
        assert_eq!(net_salary(5_000.0, "London"), 3_923);
        assert_eq!(net_salary(12_000.0, "London"), 7_563);

        let items = tax_breakdown(5_000.0, "London");
        assert_eq!(labels(&items), vec!["UK Income Tax", "National Insurance"]);
        assert_eq!(items[0].amount, 775);
        assert_eq!(items[1].amount, 302);
    }

    #[test]
    fn london_below_personal_allowance_has_no_deductions() {
        assert_eq!(net_salary(1_000.0, "London"), 1_000);
        assert!(tax_breakdown(1_000.0, "London").is_empty());
    }

    #[test]
    fn oracle_germany_brackets_and_social_security() {
        assert_eq!(net_salary(5_000.0, "Berlin"), 3_032);
        assert_eq!(net_salary(10_000.0, "Munich"), 5_033);
        assert_eq!(net_salary(30_000.0, "Berlin"), 12_428);

        let items = tax_breakdown(5_000.0, "Berlin");
        assert_eq!(labels(&items), vec!["German Income Tax", "Social Security"]);
        assert_eq!(items[0].amount, 968);
        assert_eq!(items[1].amount, 1_000);
    }

    #[test]
    fn germany_below_allowance_only_lists_social_security() {
        assert_eq!(net_salary(800.0, "Berlin"), 640);
        let items = tax_breakdown(800.0, "Berlin");
        assert_eq!(labels(&items), vec!["Social Security"]);
        assert_eq!(items[0].amount, 160);
    }

    #[test]
    fn oracle_amsterdam_taxes_only_seventy_percent() {
        assert_eq!(net_salary(5_000.0, "Amsterdam"), 3_706);
        assert_eq!(net_salary(10_000.0, "Amsterdam"), 7_324);

        let items = tax_breakdown(10_000.0, "amsterdam");
        assert_eq!(
            items,
            vec![
                TaxBreakdownItem {
                    label: "30% Ruling Benefit",
                    amount: 0
                },
                TaxBreakdownItem {
                    label: "Dutch Income Tax",
                    amount: 2_676
                },
            ]
        );
    }

    #[test]
    fn amsterdam_ruling_line_is_listed_even_without_income() {
        let items = tax_breakdown(0.0, "Amsterdam");
        assert_eq!(labels(&items), vec!["30% Ruling Benefit"]);
    }

    #[test]
    fn oracle_warsaw_breakdown() {
        let items = tax_breakdown(6_000.0, "Warsaw");
        assert_eq!(
            items,
            vec![
                TaxBreakdownItem {
                    label: "B2B Flat Income Tax",
                    amount: 720
                },
                TaxBreakdownItem {
                    label: "ZUS & Health Contrib.",
                    amount: 500
                },
            ]
        );
        assert_eq!(net_salary(6_000.0, "Warsaw"), 4_780);
    }

    #[test]
    fn warsaw_fixed_contribution_floors_net_at_zero() {
        assert_eq!(net_salary(0.0, "Warsaw"), 0);
        assert_eq!(net_salary(400.0, "Warsaw"), 0);
        assert_eq!(net_salary(568.0, "Warsaw"), 0);
        assert_eq!(net_salary(569.0, "Warsaw"), 1);

        let items = tax_breakdown(0.0, "Warsaw");
        assert_eq!(labels(&items), vec!["ZUS & Health Contrib."]);
    }

    #[test]
    fn default_rule_lists_single_estimate() {
        let items = tax_breakdown(4_000.0, "Lisbon");
        assert_eq!(
            items,
            vec![TaxBreakdownItem {
                label: "Estimated Euro Tax",
                amount: 1_400
            }]
        );
        assert!(tax_breakdown(0.0, "Lisbon").is_empty());
    }

    #[test]
    fn spain_breakdown_uses_flat_label() {
        let items = tax_breakdown(5_000.0, "Madrid");
        assert_eq!(labels(&items), vec!["Beckham Law Tax (Flat 24%)"]);
        assert_eq!(items[0].amount, 1_200);
    }

    #[test]
    fn invalid_gross_is_treated_as_no_income() {
        for city in NAMED_CITIES {
            assert_eq!(net_salary(-2_500.0, city), 0);
            assert_eq!(net_salary(f64::NAN, city), 0);
            assert_eq!(net_salary(f64::INFINITY, city), 0);
            assert_eq!(tax_breakdown(f64::NAN, city), tax_breakdown(0.0, city));
        }
    }

    #[test]
    fn zero_income_yields_zero_net_everywhere() {
        for city in NAMED_CITIES {
            assert_eq!(net_salary(0.0, city), 0, "{city}");
        }
    }

    #[test]
    fn breakdown_rounding_is_independent_of_net_rounding() {
        // Known approximation: items and net are rounded separately.
        for gross in [3_333.0, 4_567.0, 7_891.0] {
            for city in NAMED_CITIES {
                let deducted: u64 = tax_breakdown(gross, city).iter().map(|i| i.amount).sum();
                let implied = gross as i64 - net_salary(gross, city) as i64;
                assert!(
                    (deducted as i64 - implied).abs() <= 2,
                    "{city} at {gross}: items {deducted}, implied {implied}"
                );
            }
        }
    }

    #[test]
    fn net_stays_monotone_up_to_the_largest_finite_gross() {
        let grosses = [1.0e15, 1.0e300, 1.0e307, 1.6e307, f64::MAX / 12.0, f64::MAX];
        for city in NAMED_CITIES {
            let nets: Vec<u64> = grosses.iter().map(|g| net_salary(*g, city)).collect();
            assert!(
                nets.windows(2).all(|w| w[1] >= w[0]),
                "{city} net fell somewhere in {nets:?}"
            );
            assert_eq!(nets[nets.len() - 1], u64::MAX, "{city}");
        }
    }

    #[test]
    fn huge_gross_breakdown_saturates_instead_of_vanishing() {
        let items = tax_breakdown(1.6e307, "Berlin");
        assert_eq!(labels(&items), vec!["German Income Tax", "Social Security"]);
        assert!(items.iter().all(|i| i.amount == u64::MAX));
        assert_eq!(net_salary(1.6e307, "Berlin"), u64::MAX);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(256))]

        #[test]
        fn prop_unlisted_cities_keep_sixty_five_percent(
            gross in 0u32..1_000_000,
            city in "[a-z]{3,12}"
        ) {
            prop_assume!(Jurisdiction::for_city(&city) == Jurisdiction::EuropeanAverage);
            let g = gross as f64;
            let expected = (g * 12.0 * 0.65 / 12.0).round() as u64;
            prop_assert_eq!(net_salary(g, &city), expected);
        }

        #[test]
        fn prop_spain_is_a_flat_seventy_six_percent(gross in 0u32..1_000_000) {
            let g = gross as f64;
            let expected = (g * 12.0 * 0.76 / 12.0).round() as u64;
            prop_assert_eq!(net_salary(g, "Madrid"), expected);
            prop_assert_eq!(net_salary(g, "Barcelona"), expected);
        }

        #[test]
        fn prop_net_is_monotone_in_gross(
            gross in 0u32..60_000,
            step in 1u32..5_000,
            city_idx in 0usize..8
        ) {
            let city = NAMED_CITIES[city_idx];
            let low = net_salary(gross as f64, city);
            let high = net_salary((gross + step) as f64, city);
            prop_assert!(high >= low, "{} net fell from {} to {}", city, low, high);
        }

        #[test]
        fn prop_net_never_exceeds_gross(gross in 0u32..500_000, city_idx in 0usize..8) {
            let city = NAMED_CITIES[city_idx];
            prop_assert!(net_salary(gross as f64, city) <= gross as u64);
        }
    }
}
