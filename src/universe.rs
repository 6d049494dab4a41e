//! Static ticker universes.
//!
//! The three fixed, per-class ticker lists eligible for scanning. This is
//! configuration data, not behavior: the screener dispatches filter rules
//! by the class a list belongs to. Symbols carry the exchange suffix the
//! quote provider expects.

use crate::data::AssetClass;

/// B3-listed stocks.
pub const STOCKS: &[&str] = &[
    "ABCB4.SA", "ABEV3.SA", "AGRO3.SA", "ALUP11.SA", "B3SA3.SA", "BBAS3.SA",
    "BBDC3.SA", "BBDC4.SA", "BBSE3.SA", "BEES3.SA", "BMEB4.SA", "BRAP4.SA",
    "BRSR6.SA", "CGAS5.SA", "CGRA4.SA", "CLSC4.SA", "CMIG3.SA", "CMIG4.SA",
    "CMIN3.SA", "CPFE3.SA", "CPLE6.SA", "CSMG3.SA", "CSNA3.SA", "CXSE3.SA",
    "CYRE3.SA", "DIRR3.SA", "EGIE3.SA", "EKTR4.SA", "ELET3.SA", "ENGI11.SA",
    "EQTL3.SA", "FESA4.SA", "FLRY3.SA", "GGBR4.SA", "GOAU4.SA", "GRND3.SA",
    "ISAE4.SA", "ITSA4.SA", "ITUB4.SA", "JBSS3.SA", "KEPL3.SA", "KLBN11.SA",
    "LAVV3.SA", "LEVE3.SA", "MRVE3.SA", "ODPV3.SA", "PETR3.SA", "PETR4.SA",
    "PSSA3.SA", "RANI3.SA", "SANB11.SA", "SAPR11.SA", "SBSP3.SA", "SLCE3.SA",
    "TAEE11.SA", "TGMA3.SA", "TIMS3.SA", "TRPL4.SA", "UNIP6.SA", "USIM5.SA",
    "VALE3.SA", "VBBR3.SA", "VIVT3.SA", "WEGE3.SA", "WIZC3.SA",
];

/// Real-estate funds (FIIs).
pub const FUNDS: &[&str] = &[
    "AFHI11.SA", "ALZR11.SA", "BCRI11.SA", "BRCO11.SA", "BTCI11.SA",
    "BTLG11.SA", "CPTS11.SA", "CVBI11.SA", "GARE11.SA", "GGRC11.SA",
    "HGBS11.SA", "HGCR11.SA", "HGLG11.SA", "HGRE11.SA", "HGRU11.SA",
    "HSML11.SA", "IRDM11.SA", "JSRE11.SA", "KNCR11.SA", "KNIP11.SA",
    "KNRI11.SA", "KNSC11.SA", "LVBI11.SA", "MALL11.SA", "MCCI11.SA",
    "MXRF11.SA", "PVBI11.SA", "RBRF11.SA", "RBRR11.SA", "RECR11.SA",
    "RZTR11.SA", "SARE11.SA", "TGAR11.SA", "TRXF11.SA", "VGIR11.SA",
    "VILG11.SA", "VINO11.SA", "VISC11.SA", "XPLG11.SA", "XPML11.SA",
];

/// Brazilian Depositary Receipts.
pub const BDRS: &[&str] = &[
    "AAPL34.SA", "ABBV34.SA", "ABTT34.SA", "AMGN34.SA", "AVGO34.SA",
    "AXPB34.SA", "BOAC34.SA", "CATP34.SA", "CHVX34.SA", "CMCS34.SA",
    "COCA34.SA", "COLG34.SA", "CSCO34.SA", "CTSH34.SA", "CVSH34.SA",
    "DUKB34.SA", "EXXO34.SA", "FDMO34.SA", "GILD34.SA", "GSGI34.SA",
    "HOME34.SA", "HONB34.SA", "IBMB34.SA", "ITLC34.SA", "JNJB34.SA",
    "JPMC34.SA", "KMBB34.SA", "LILY34.SA", "LMTB34.SA", "MCDC34.SA",
    "MRCK34.SA", "MSFT34.SA", "NIKE34.SA", "ORCL34.SA", "PEPB34.SA",
    "PFIZ34.SA", "PGCO34.SA", "QCOM34.SA", "SBUB34.SA", "TGTB34.SA",
    "TXSA34.SA", "UPSS34.SA", "USBC34.SA", "VERZ34.SA", "VISA34.SA",
    "WALM34.SA",
];

/// The static universe for an asset class.
pub fn tickers_for(asset_class: AssetClass) -> &'static [&'static str] {
    match asset_class {
        AssetClass::Stock => STOCKS,
        AssetClass::Bdr => BDRS,
        AssetClass::Fund => FUNDS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_universes_non_empty() {
        for class in AssetClass::all() {
            assert!(!tickers_for(class).is_empty());
        }
    }

    #[test]
    fn test_no_duplicates_within_class() {
        for class in AssetClass::all() {
            let tickers = tickers_for(class);
            let unique: HashSet<&&str> = tickers.iter().collect();
            assert_eq!(unique.len(), tickers.len(), "duplicates in {}", class);
        }
    }

    #[test]
    fn test_tickers_carry_exchange_suffix() {
        for class in AssetClass::all() {
            for ticker in tickers_for(class) {
                assert!(ticker.ends_with(".SA"), "missing suffix on {}", ticker);
            }
        }
    }

    #[test]
    fn test_classes_do_not_overlap() {
        let stocks: HashSet<&&str> = STOCKS.iter().collect();
        assert!(FUNDS.iter().all(|t| !stocks.contains(t)));
        assert!(BDRS.iter().all(|t| !stocks.contains(t)));
    }
}
