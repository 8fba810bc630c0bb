// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

/// A selectable currency and the territory whose flag represents it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyEntry {
    pub code: &'static str,
    pub name: &'static str,
    pub country: &'static str,
}

/// Currencies shown first in every selector, in this order.
pub const POPULAR_CURRENCIES: [&str; 8] = ["USD", "EUR", "GBP", "JPY", "CAD", "AUD", "INR", "CNY"];

pub const POPULAR_LABEL: &str = "Popular Currencies";
pub const OTHERS_LABEL: &str = "All Currencies";

macro_rules! currencies {
    ($(($code:literal, $name:literal, $country:literal)),* $(,)?) => {
        &[$(CurrencyEntry { code: $code, name: $name, country: $country }),*]
    };
}

/// Backing table. Declaration order is the order of the "All Currencies" group.
pub static CURRENCIES: &[CurrencyEntry] = currencies![
    ("AED", "UAE Dirham", "AE"),
    ("AFN", "Afghan Afghani", "AF"),
    ("XCD", "East Caribbean Dollar", "AG"),
    ("ALL", "Albanian Lek", "AL"),
    ("AMD", "Armenian Dram", "AM"),
    ("ANG", "Netherlands Antillean Guilder", "AN"),
    ("AOA", "Angolan Kwanza", "AO"),
    ("ARS", "Argentine Peso", "AR"),
    ("AUD", "Australian Dollar", "AU"),
    ("AZN", "Azerbaijani Manat", "AZ"),
    ("BAM", "Bosnia-Herzegovina Convertible Mark", "BA"),
    ("BBD", "Barbadian Dollar", "BB"),
    ("BDT", "Bangladeshi Taka", "BD"),
    ("XOF", "West African CFA Franc", "BE"),
    ("BGN", "Bulgarian Lev", "BG"),
    ("BHD", "Bahraini Dinar", "BH"),
    ("BIF", "Burundian Franc", "BI"),
    ("BMD", "Bermudan Dollar", "BM"),
    ("BND", "Brunei Dollar", "BN"),
    ("BOB", "Bolivian Boliviano", "BO"),
    ("BRL", "Brazilian Real", "BR"),
    ("BSD", "Bahamian Dollar", "BS"),
    ("NOK", "Norwegian Krone", "BV"),
    ("BWP", "Botswanan Pula", "BW"),
    ("BYN", "Belarusian Ruble", "BY"),
    ("BZD", "Belize Dollar", "BZ"),
    ("CAD", "Canadian Dollar", "CA"),
    ("CDF", "Congolese Franc", "CD"),
    ("XAF", "Central African CFA Franc", "CF"),
    ("CHF", "Swiss Franc", "CH"),
    ("CLP", "Chilean Peso", "CL"),
    ("CNY", "Chinese Yuan", "CN"),
    ("COP", "Colombian Peso", "CO"),
    ("CRC", "Costa Rican Colon", "CR"),
    ("CUP", "Cuban Peso", "CU"),
    ("CVE", "Cape Verdean Escudo", "CV"),
    ("CZK", "Czech Koruna", "CZ"),
    ("DJF", "Djiboutian Franc", "DJ"),
    ("DKK", "Danish Krone", "DK"),
    ("DOP", "Dominican Peso", "DO"),
    ("DZD", "Algerian Dinar", "DZ"),
    ("EGP", "Egyptian Pound", "EG"),
    ("ETB", "Ethiopian Birr", "ET"),
    ("EUR", "Euro", "FR"),
    ("FJD", "Fijian Dollar", "FJ"),
    ("FKP", "Falkland Islands Pound", "FK"),
    ("GBP", "British Pound", "GB"),
    ("GEL", "Georgian Lari", "GE"),
    ("GGP", "Guernsey Pound", "GG"),
    ("GHS", "Ghanaian Cedi", "GH"),
    ("GIP", "Gibraltar Pound", "GI"),
    ("GMD", "Gambian Dalasi", "GM"),
    ("GNF", "Guinean Franc", "GN"),
    ("GTQ", "Guatemalan Quetzal", "GT"),
    ("GYD", "Guyanaese Dollar", "GY"),
    ("HKD", "Hong Kong Dollar", "HK"),
    ("HNL", "Honduran Lempira", "HN"),
    ("HTG", "Haitian Gourde", "HT"),
    ("HUF", "Hungarian Forint", "HU"),
    ("IDR", "Indonesian Rupiah", "ID"),
    ("ILS", "Israeli New Shekel", "IL"),
    ("INR", "Indian Rupee", "IN"),
    ("IQD", "Iraqi Dinar", "IQ"),
    ("IRR", "Iranian Rial", "IR"),
    ("ISK", "Icelandic Krona", "IS"),
    ("JMD", "Jamaican Dollar", "JM"),
    ("JOD", "Jordanian Dinar", "JO"),
    ("JPY", "Japanese Yen", "JP"),
    ("KES", "Kenyan Shilling", "KE"),
    ("KGS", "Kyrgystani Som", "KG"),
    ("KHR", "Cambodian Riel", "KH"),
    ("KMF", "Comorian Franc", "KM"),
    ("KPW", "North Korean Won", "KP"),
    ("KRW", "South Korean Won", "KR"),
    ("KWD", "Kuwaiti Dinar", "KW"),
    ("KYD", "Cayman Islands Dollar", "KY"),
    ("KZT", "Kazakhstani Tenge", "KZ"),
    ("LAK", "Laotian Kip", "LA"),
    ("LBP", "Lebanese Pound", "LB"),
    ("LKR", "Sri Lankan Rupee", "LK"),
    ("LRD", "Liberian Dollar", "LR"),
    ("LSL", "Lesotho Loti", "LS"),
    ("LYD", "Libyan Dinar", "LY"),
    ("MAD", "Moroccan Dirham", "MA"),
    ("MDL", "Moldovan Leu", "MD"),
    ("MGA", "Malagasy Ariary", "MG"),
    ("MKD", "Macedonian Denar", "MK"),
    ("MMK", "Myanmar Kyat", "MM"),
    ("MNT", "Mongolian Tugrik", "MN"),
    ("MOP", "Macanese Pataca", "MO"),
    ("MRU", "Mauritanian Ouguiya", "MR"),
    ("MUR", "Mauritian Rupee", "MU"),
    ("MVR", "Maldivian Rufiyaa", "MV"),
    ("MWK", "Malawian Kwacha", "MW"),
    ("MXN", "Mexican Peso", "MX"),
    ("MYR", "Malaysian Ringgit", "MY"),
    ("MZN", "Mozambican Metical", "MZ"),
    ("NAD", "Namibian Dollar", "NA"),
    ("XPF", "CFP Franc", "NC"),
    ("NGN", "Nigerian Naira", "NG"),
    ("NIO", "Nicaraguan Cordoba", "NI"),
    ("NPR", "Nepalese Rupee", "NP"),
    ("NZD", "New Zealand Dollar", "NZ"),
    ("OMR", "Omani Rial", "OM"),
    ("PAB", "Panamanian Balboa", "PA"),
    ("PEN", "Peruvian Sol", "PE"),
    ("PGK", "Papua New Guinean Kina", "PG"),
    ("PHP", "Philippine Peso", "PH"),
    ("PKR", "Pakistani Rupee", "PK"),
    ("PLN", "Polish Zloty", "PL"),
    ("PYG", "Paraguayan Guarani", "PY"),
    ("QAR", "Qatari Riyal", "QA"),
    ("RON", "Romanian Leu", "RO"),
    ("RSD", "Serbian Dinar", "RS"),
    ("RUB", "Russian Ruble", "RU"),
    ("RWF", "Rwandan Franc", "RW"),
    ("SAR", "Saudi Riyal", "SA"),
    ("SBD", "Solomon Islands Dollar", "SB"),
    ("SCR", "Seychellois Rupee", "SC"),
    ("SDG", "Sudanese Pound", "SD"),
    ("SEK", "Swedish Krona", "SE"),
    ("SGD", "Singapore Dollar", "SG"),
    ("SLE", "Sierra Leonean Leone", "SL"),
    ("SOS", "Somali Shilling", "SO"),
    ("SRD", "Surinamese Dollar", "SR"),
    ("STN", "Sao Tome and Principe Dobra", "ST"),
    ("SYP", "Syrian Pound", "SY"),
    ("SZL", "Swazi Lilangeni", "SZ"),
    ("THB", "Thai Baht", "TH"),
    ("TJS", "Tajikistani Somoni", "TJ"),
    ("TMT", "Turkmenistani Manat", "TM"),
    ("TND", "Tunisian Dinar", "TN"),
    ("TOP", "Tongan Pa'anga", "TO"),
    ("TRY", "Turkish Lira", "TR"),
    ("TTD", "Trinidad and Tobago Dollar", "TT"),
    ("TWD", "New Taiwan Dollar", "TW"),
    ("TZS", "Tanzanian Shilling", "TZ"),
    ("UAH", "Ukrainian Hryvnia", "UA"),
    ("UGX", "Ugandan Shilling", "UG"),
    ("USD", "US Dollar", "US"),
    ("UYU", "Uruguayan Peso", "UY"),
    ("UZS", "Uzbekistani Som", "UZ"),
    ("VES", "Venezuelan Bolivar", "VE"),
    ("VND", "Vietnamese Dong", "VN"),
    ("VUV", "Vanuatu Vatu", "VU"),
    ("YER", "Yemeni Rial", "YE"),
    ("ZAR", "South African Rand", "ZA"),
    ("ZMW", "Zambian Kwacha", "ZM"),
    ("ZWL", "Zimbabwean Dollar", "ZW"),
];

/// The two selector groups.
#[derive(Debug)]
pub struct CurrencyGroups {
    pub popular: Vec<&'static CurrencyEntry>,
    pub others: Vec<&'static CurrencyEntry>,
}

impl CurrencyGroups {
    /// Popular first, then everything else, without repeats.
    pub fn ordered(&self) -> impl Iterator<Item = &'static CurrencyEntry> + '_ {
        self.popular.iter().chain(self.others.iter()).copied()
    }
}

pub fn list_currencies() -> CurrencyGroups {
    let popular = POPULAR_CURRENCIES.iter().filter_map(|code| lookup(code)).collect();
    let others = CURRENCIES
        .iter()
        .filter(|entry| !POPULAR_CURRENCIES.contains(&entry.code))
        .collect();

    CurrencyGroups { popular, others }
}

/// Find a registered currency, ignoring ASCII case.
pub fn lookup(code: &str) -> Option<&'static CurrencyEntry> {
    CURRENCIES
        .iter()
        .find(|entry| entry.code.eq_ignore_ascii_case(code))
}

/// Display name, or the code itself when it is not registered.
pub fn display_name(code: &str) -> &str {
    lookup(code).map_or(code, |entry| entry.name)
}

pub fn country_code(code: &str) -> Option<&'static str> {
    lookup(code).map(|entry| entry.country)
}

/// Label used for an option in a currency selector.
pub fn option_label(entry: &CurrencyEntry) -> String {
    format!("{} - {}", entry.code, entry.name)
}

/// What a flag region shows for the selected currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flag {
    pub url: String,
    pub alt: String,
    pub emoji: String,
}

impl Flag {
    pub fn for_currency(entry: &CurrencyEntry, provider: &str) -> Self {
        let country = country_code(entry.code).unwrap_or(entry.country);
        Self {
            url: flag_url(provider, country),
            alt: format!("{} flag", entry.code),
            emoji: flag_emoji(country),
        }
    }
}

pub fn flag_url(provider: &str, country: &str) -> String {
    format!("https://{}/{}/flat/64.png", provider.trim_end_matches('/'), country)
}

/// Regional-indicator pair for a two-letter territory code ("IN" -> 🇮🇳).
pub fn flag_emoji(country: &str) -> String {
    country
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .filter_map(|c| char::from_u32(0x1F1E6 + (c.to_ascii_uppercase() as u32 - 'A' as u32)))
        .collect()
}
